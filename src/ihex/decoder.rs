use log::{debug, trace, warn};

use super::record::{decode_line, ByteRecord};
use super::{DecodeError, RecordError};
use crate::buffer::{FirmwareImage, Provenance};

/// 解析後のイメージはこの単位まで 0xFF で埋める
pub const BLOCK_SIZE: usize = 256;

/// デコーダの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Scanning,
    /// データレコードを反映中
    Applying,
    /// 致命的なエラーで中断（終端）
    Failed,
    /// 入力を最後まで読んだ（終端）
    Complete,
}

/// Intel HEX のテキスト全体を解析してイメージを作成
///
/// 失敗した場合、途中まで作ったイメージは返さない。
pub fn decode(text: &str) -> Result<FirmwareImage, DecodeError> {
    let mut decoder = HexDecoder::new();
    // CRLF / LF / CR のいずれの改行でも1行として数える
    let lines = text
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'));
    for (index, line) in lines.enumerate() {
        decoder.feed_line(index + 1, line)?;
    }
    decoder.finish()
}

/// 1行ずつ受け取ってイメージを組み立てる
#[derive(Debug, Default)]
pub struct HexDecoder {
    image: FirmwareImage,
    /// 次に連続して書き込まれるはずのオフセット
    next: usize,
    state: DecodeState,
    failure: Option<DecodeError>,
    records: usize,
}

impl HexDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// 1行を処理する。致命的なエラーで Failed に遷移する
    pub fn feed_line(&mut self, line_no: usize, line: &str) -> Result<(), DecodeError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        if self.state == DecodeState::Complete {
            warn!("line {}: ignored after end of input", line_no);
            return Ok(());
        }

        match decode_line(line) {
            Ok(record) => {
                self.records += 1;
                if record.is_data() {
                    self.state = DecodeState::Applying;
                    self.apply(&record);
                    self.state = DecodeState::Scanning;
                } else {
                    debug!(
                        "line {}: ignoring record type {:02X} at {:04X}",
                        line_no, record.record_type, record.address
                    );
                }
                Ok(())
            }
            Err(RecordError::NotARecord) => {
                trace!("line {}: skipped", line_no);
                Ok(())
            }
            Err(kind) => {
                let failure = DecodeError { line: line_no, kind };
                self.state = DecodeState::Failed;
                self.failure = Some(failure);
                warn!("{}", failure);
                Err(failure)
            }
        }
    }

    fn apply(&mut self, record: &ByteRecord) {
        let address = record.address as usize;

        // 後方へ戻るレコードはギャップなし
        if address > self.next {
            self.image
                .fill_range(self.next, address - self.next, Provenance::Fill);
        }

        self.image.write(address, &record.payload, Provenance::Explicit);
        self.next = address + record.byte_count as usize;
    }

    /// 入力終端。ブロック境界までパディングしてイメージを返す
    ///
    /// 失敗済みの場合は最初のエラーを返す。完了後に再度呼ぶと同じイメージを返す。
    pub fn finish(&mut self) -> Result<FirmwareImage, DecodeError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        if self.state == DecodeState::Complete {
            return Ok(self.image.clone());
        }

        let len = self.image.len();
        let pad = (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE;
        if pad > 0 {
            self.image.fill_range(len, pad, Provenance::Fill);
        }
        self.state = DecodeState::Complete;

        debug!(
            "decoded {} records, {} explicit bytes, image length {}",
            self.records,
            self.image.explicit_len(),
            self.image.len()
        );
        Ok(self.image.clone())
    }
}
