//! 標準エラー出力へのロガー

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// ロガーを登録する
pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))
}

pub struct Logger {
    pub level: LevelFilter,
}

impl Logger {
    /// `-v` の回数からレベルを決める
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Self { level }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("fwimage")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};

    #[test]
    fn verbosity_levels() {
        assert_eq!(Logger::from_verbosity(0).level, LevelFilter::Warn);
        assert_eq!(Logger::from_verbosity(2).level, LevelFilter::Debug);
        assert_eq!(Logger::from_verbosity(9).level, LevelFilter::Trace);
    }

    #[test]
    fn filters_foreign_targets() {
        let logger = Logger::from_verbosity(1);
        let ours = Metadata::builder().level(Level::Info).target("fwimage::session").build();
        let debug = Metadata::builder().level(Level::Debug).target("fwimage::ihex").build();
        let other = Metadata::builder().level(Level::Error).target("clap").build();
        assert!(logger.enabled(&ours));
        assert!(!logger.enabled(&debug));
        assert!(!logger.enabled(&other));
    }
}
