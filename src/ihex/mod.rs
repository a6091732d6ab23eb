//! Intel HEX の読み書き

pub mod checksum;
mod decoder;
mod encoder;
mod record;

pub use decoder::{decode, DecodeState, HexDecoder, BLOCK_SIZE};
pub use encoder::{encode, EncodeOptions};
pub use record::{decode_line, encode_line, ByteRecord, RECORD_DATA, RECORD_EOF};

use thiserror::Error;

/// 1行単位の解析エラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RecordError {
    /// ':' で始まらない行（読み飛ばす）
    #[error("line is not a record")]
    NotARecord,
    #[error("record is too short")]
    TooShort,
    #[error("record contains invalid hex digits")]
    InvalidHex,
    #[error("record decodes to no bytes")]
    EmptyPayload,
    #[error("checksum mismatch (expected {expected:02X}, found {found:02X})")]
    ChecksumMismatch { expected: u8, found: u8 },
}

impl RecordError {
    /// ファイル全体の解析を中断すべきエラーかどうか
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RecordError::NotARecord)
    }
}

/// ファイル単位の解析エラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct DecodeError {
    /// 1 始まりの行番号
    pub line: usize,
    pub kind: RecordError,
}

/// 書き出しエラー
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// 16 ビットのアドレスに収まらないデータ
    #[error("data at {offset:#X} does not fit in a 16-bit record address")]
    AddressOverflow { offset: usize },
    /// 1レコードに入らない長さのデータ
    #[error("payload of {len} bytes does not fit in one record")]
    PayloadTooLong { len: usize },
    #[error("bytes per record must be between 1 and 255")]
    InvalidRecordWidth,
}
