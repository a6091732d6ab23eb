//! fwx - Firmware image tool
//!
//! Inspect and convert Intel HEX and raw binary firmware images.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fwimage::ihex::EncodeOptions;
use fwimage::inspect::DataView;
use fwimage::logging::{self, Logger};
use fwimage::{FirmwareImage, Provenance, Session};

/// Firmware image tool
#[derive(Parser, Debug)]
#[command(name = "fwx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show image size and explicit/fill regions
    Info {
        /// Image file (*.hex / *.ihex as Intel HEX, anything else as binary)
        file: String,
    },

    /// Hex dump of the image
    Dump {
        file: String,

        /// Range in format "start:end" (hex with 0x prefix, or decimal)
        #[arg(short, long)]
        range: Option<String>,

        /// Print fill bytes as FF instead of ".."
        #[arg(long)]
        show_fill: bool,
    },

    /// Convert between Intel HEX and binary (format from file extensions)
    Conv {
        input: String,
        output: String,

        /// Data bytes per Intel HEX record
        #[arg(short, long, default_value = "16")]
        width: u8,

        /// Also write fill regions as data records
        #[arg(long)]
        keep_fill: bool,
    },

    /// Show integer views of the bytes at an offset
    Inspect {
        file: String,

        /// Offset (hex with 0x prefix, or decimal)
        offset: String,
    },

    /// Decode only; exit status tells whether the file is valid
    Check { file: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(Logger::from_verbosity(args.verbose))?;

    match args.command {
        Command::Info { file } => cmd_info(&file),
        Command::Dump { file, range, show_fill } => cmd_dump(&file, range.as_deref(), show_fill),
        Command::Conv { input, output, width, keep_fill } => cmd_conv(&input, &output, width, keep_fill),
        Command::Inspect { file, offset } => cmd_inspect(&file, &offset),
        Command::Check { file } => cmd_check(&file),
    }
}

/// Open a file into a fresh session
fn open(path: &str) -> Result<Session> {
    let mut session = Session::new();
    session.open(path).with_context(|| format!("cannot open {}", path))?;
    Ok(session)
}

fn image(session: &Session) -> Result<&FirmwareImage> {
    session.image().context("no image loaded")
}

/// Parse range string "start:end"
fn parse_range(s: &str, max_len: usize) -> Result<(usize, usize)> {
    let Some((start, end)) = s.split_once(':') else {
        bail!("Range must be in format 'start:end'");
    };

    let start = if start.is_empty() { 0 } else { parse_offset(start)? };
    let end = if end.is_empty() { max_len } else { parse_offset(end)? };

    if start > end {
        bail!("Range start {:#X} is after end {:#X}", start, end);
    }
    Ok((start, end.min(max_len)))
}

/// Parse offset (hex with 0x prefix or decimal)
fn parse_offset(s: &str) -> Result<usize> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| anyhow::anyhow!("Invalid hex offset: {}", e))
    } else {
        s.parse().map_err(|e| anyhow::anyhow!("Invalid offset: {}", e))
    }
}

// === Commands ===

fn cmd_info(path: &str) -> Result<()> {
    let session = open(path)?;
    let image = image(&session)?;

    let explicit = image.explicit_len();
    println!("Size: {} bytes (0x{:X})", image.len(), image.len());
    println!("Explicit: {} bytes", explicit);
    println!("Fill: {} bytes", image.len() - explicit);

    for region in image.regions() {
        let kind = match region.provenance {
            Provenance::Explicit => "data",
            Provenance::Fill => "fill",
        };
        println!(
            "  0x{:08X}..0x{:08X}  {}  ({} bytes)",
            region.range.start,
            region.range.end,
            kind,
            region.range.len()
        );
    }

    Ok(())
}

fn cmd_dump(path: &str, range: Option<&str>, show_fill: bool) -> Result<()> {
    let session = open(path)?;
    let image = image(&session)?;

    let (start, end) = match range {
        Some(r) => parse_range(r, image.len())?,
        None => (0, image.len()),
    };
    if start > end {
        bail!("Start offset {} exceeds image size {}", start, image.len());
    }

    let slice = image.read(start, end - start)?;
    for (i, chunk) in slice.chunks(16).enumerate() {
        let offset = start + i * 16;
        print!("{:08X}  ", offset);
        for (j, byte) in chunk.iter().enumerate() {
            if !show_fill && image.provenance(offset + j) == Some(Provenance::Fill) {
                print!(".. ");
            } else {
                print!("{:02X} ", byte);
            }
            if j == 7 {
                print!(" ");
            }
        }
        println!();
    }

    Ok(())
}

fn cmd_conv(input: &str, output: &str, width: u8, keep_fill: bool) -> Result<()> {
    let options = EncodeOptions {
        bytes_per_record: width,
        skip_fill: !keep_fill,
    };
    let mut session = open(input)?.with_encode_options(options);
    session
        .save_as(output)
        .with_context(|| format!("cannot write {}", output))?;
    Ok(())
}

fn cmd_inspect(path: &str, offset: &str) -> Result<()> {
    let session = open(path)?;
    let offset = parse_offset(offset)?;
    let view = DataView::at(image(&session)?, offset)?;

    println!("int8:   {}", view.int8);
    println!("uint8:  {}", view.uint8);
    let rows = [
        ("int16", view.int16.map(|v| v.to_string())),
        ("uint16", view.uint16.map(|v| v.to_string())),
        ("int32", view.int32.map(|v| v.to_string())),
        ("uint32", view.uint32.map(|v| v.to_string())),
        ("int64", view.int64.map(|v| v.to_string())),
        ("uint64", view.uint64.map(|v| v.to_string())),
    ];
    for (name, value) in rows {
        println!("{:<7} {}", format!("{}:", name), value.unwrap_or_default());
    }

    Ok(())
}

fn cmd_check(path: &str) -> Result<()> {
    let session = open(path)?;
    let image = image(&session)?;
    println!("{}: OK ({} bytes, {} explicit)", path, image.len(), image.explicit_len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("0x100").unwrap(), 0x100);
        assert_eq!(parse_offset("0XfF").unwrap(), 0xFF);
        assert_eq!(parse_offset("42").unwrap(), 42);
        assert!(parse_offset("zz").is_err());
    }

    #[test]
    fn ranges() {
        assert_eq!(parse_range("0x10:0x20", 0x100).unwrap(), (0x10, 0x20));
        assert_eq!(parse_range(":", 0x100).unwrap(), (0, 0x100));
        assert_eq!(parse_range("0x10:0x1000", 0x100).unwrap(), (0x10, 0x100));
        assert!(parse_range("0x20:0x10", 0x100).is_err());
        assert!(parse_range("10", 0x100).is_err());
    }
}
