use std::fmt::Write as _;

use super::checksum;
use super::{EncodeError, RecordError};

/// ':' を含む最短の行長
pub const MIN_LINE_LEN: usize = 9;

/// 長さ・アドレス(2)・種別・チェックサムの合計バイト数
const FRAME_OVERHEAD: usize = 5;

/// データレコード
pub const RECORD_DATA: u8 = 0x00;
/// End Of File レコード
pub const RECORD_EOF: u8 = 0x01;

/// Intel HEX の1行を解析したレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRecord {
    pub byte_count: u8,
    pub address: u16,
    pub record_type: u8,
    pub payload: Vec<u8>,
    pub checksum: u8,
}

impl ByteRecord {
    /// 任意の種別のレコードを作成（チェックサムは自動計算）
    pub fn new(address: u16, record_type: u8, payload: Vec<u8>) -> Result<Self, EncodeError> {
        let byte_count = u8::try_from(payload.len())
            .map_err(|_| EncodeError::PayloadTooLong { len: payload.len() })?;
        Ok(Self::with_count(byte_count, address, record_type, payload))
    }

    /// データレコードを作成
    pub fn data(address: u16, payload: Vec<u8>) -> Result<Self, EncodeError> {
        Self::new(address, RECORD_DATA, payload)
    }

    /// End Of File レコード (`:00000001FF`)
    pub fn end_of_file() -> Self {
        Self::with_count(0, 0, RECORD_EOF, Vec::new())
    }

    fn with_count(byte_count: u8, address: u16, record_type: u8, payload: Vec<u8>) -> Self {
        let mut record = Self {
            byte_count,
            address,
            record_type,
            payload,
            checksum: 0,
        };
        record.checksum = checksum::checksum(&record.frame());
        record
    }

    pub fn is_data(&self) -> bool {
        self.record_type == RECORD_DATA
    }

    /// チェックサムを除くフレーム
    fn frame(&self) -> Vec<u8> {
        let [hi, lo] = self.address.to_be_bytes();
        let mut bytes = Vec::with_capacity(self.payload.len() + FRAME_OVERHEAD - 1);
        bytes.extend_from_slice(&[self.byte_count, hi, lo, self.record_type]);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

/// 1行をレコードに変換
pub fn decode_line(line: &str) -> Result<ByteRecord, RecordError> {
    let line = line.trim();
    let Some(body) = line.strip_prefix(':') else {
        return Err(RecordError::NotARecord);
    };
    if line.len() < MIN_LINE_LEN {
        return Err(RecordError::TooShort);
    }

    let bytes = decode_hex(body)?;
    if bytes.is_empty() {
        return Err(RecordError::EmptyPayload);
    }
    if !checksum::validate(&bytes) {
        let (&found, rest) = bytes.split_last().ok_or(RecordError::EmptyPayload)?;
        return Err(RecordError::ChecksumMismatch {
            expected: checksum::checksum(rest),
            found,
        });
    }

    let byte_count = bytes[0];
    if bytes.len() < FRAME_OVERHEAD + byte_count as usize {
        return Err(RecordError::TooShort);
    }
    let payload_start = FRAME_OVERHEAD - 1;

    Ok(ByteRecord {
        byte_count,
        address: u16::from_be_bytes([bytes[1], bytes[2]]),
        record_type: bytes[3],
        payload: bytes[payload_start..payload_start + byte_count as usize].to_vec(),
        checksum: bytes[bytes.len() - 1],
    })
}

/// レコードを1行のテキストに変換（改行なし）
pub fn encode_line(record: &ByteRecord) -> String {
    let frame = record.frame();
    let mut line = String::with_capacity(1 + (frame.len() + 1) * 2);
    line.push(':');
    for byte in &frame {
        let _ = write!(line, "{:02X}", byte);
    }
    let _ = write!(line, "{:02X}", checksum::checksum(&frame));
    line
}

/// 16進数文字列をバイト列に変換（大文字小文字どちらも可）
fn decode_hex(s: &str) -> Result<Vec<u8>, RecordError> {
    if s.len() % 2 != 0 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(RecordError::InvalidHex);
    }

    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| RecordError::InvalidHex))
        .collect()
}
