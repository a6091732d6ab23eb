//! カーソル位置のバイトを各種整数として解釈する

use crate::buffer::{BufferError, FirmwareImage};

/// カーソル位置の値（リトルエンディアン）
///
/// 読み取れる幅に足りない型は `None`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataView {
    pub int8: i8,
    pub uint8: u8,
    pub int16: Option<i16>,
    pub uint16: Option<u16>,
    pub int32: Option<i32>,
    pub uint32: Option<u32>,
    pub int64: Option<i64>,
    pub uint64: Option<u64>,
}

impl DataView {
    /// イメージの `offset` から読める最大幅（8/4/2/1）で解釈
    pub fn at(image: &FirmwareImage, offset: usize) -> Result<Self, BufferError> {
        let available = image.len().saturating_sub(offset);
        let count = match available {
            0 => {
                return Err(BufferError::OutOfRange {
                    offset,
                    count: 1,
                    len: image.len(),
                });
            }
            8.. => 8,
            4..=7 => 4,
            2..=3 => 2,
            _ => 1,
        };
        Ok(Self::from_bytes(image.read(offset, count)?))
    }

    /// 先頭バイトから解釈する。空なら既定値
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let Some(&first) = bytes.first() else {
            return Self::default();
        };

        let word = bytes.get(..2).and_then(|b| <[u8; 2]>::try_from(b).ok());
        let dword = bytes.get(..4).and_then(|b| <[u8; 4]>::try_from(b).ok());
        let qword = bytes.get(..8).and_then(|b| <[u8; 8]>::try_from(b).ok());

        Self {
            int8: first as i8,
            uint8: first,
            int16: word.map(i16::from_le_bytes),
            uint16: word.map(u16::from_le_bytes),
            int32: dword.map(i32::from_le_bytes),
            uint32: dword.map(u32::from_le_bytes),
            int64: qword.map(i64::from_le_bytes),
            uint64: qword.map(u64::from_le_bytes),
        }
    }
}
