mod image;

pub use image::{FirmwareImage, Provenance, Region, FILL_BYTE};

use thiserror::Error;

/// イメージ操作のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// 読み出し範囲がイメージ末尾を超えている
    #[error("range {offset:#X}+{count} is out of range (image length {len})")]
    OutOfRange { offset: usize, count: usize, len: usize },
}
