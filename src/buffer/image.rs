use std::ops::Range;

use super::BufferError;

/// 未書き込み領域を埋める値
pub const FILL_BYTE: u8 = 0xFF;

/// バイトの由来
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// レコードや元ファイルから来た実データ
    #[default]
    Explicit,
    /// ギャップ埋め・末尾パディングで合成した 0xFF
    Fill,
}

/// 同じ由来が連続する区間
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub range: Range<usize>,
    pub provenance: Provenance,
}

/// ファームウェアイメージ
///
/// 先頭 0 から連続したバイト列と、バイトごとの由来タグを並行して持つ。
/// 末尾方向にのみ伸び、縮むことはない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareImage {
    /// バッファデータ
    data: Vec<u8>,
    /// 由来タグ（data と常に同じ長さ）
    provenance: Vec<Provenance>,
}

impl FirmwareImage {
    /// 空のイメージを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// バイト列から作成（全バイト Explicit）
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let provenance = vec![Provenance::Explicit; data.len()];
        Self { data, provenance }
    }

    /// データの長さを取得
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// データが空かどうか
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 指定位置のバイトを取得
    pub fn get(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// 指定位置の由来を取得
    pub fn provenance(&self, pos: usize) -> Option<Provenance> {
        self.provenance.get(pos).copied()
    }

    /// `offset` から `count` バイトを読み出す
    pub fn read(&self, offset: usize, count: usize) -> Result<&[u8], BufferError> {
        match offset.checked_add(count) {
            Some(end) if end <= self.data.len() => Ok(&self.data[offset..end]),
            _ => Err(BufferError::OutOfRange {
                offset,
                count,
                len: self.data.len(),
            }),
        }
    }

    /// `offset` からデータを上書きする
    ///
    /// 末尾を超える場合はイメージを伸ばす。書き込み範囲に含まれない
    /// 新しいギャップは 0xFF / Fill のまま残る。
    pub fn write(&mut self, offset: usize, data: &[u8], tag: Provenance) {
        let end = offset + data.len();
        self.grow_to(end);
        self.data[offset..end].copy_from_slice(data);
        self.provenance[offset..end].fill(tag);
    }

    /// `offset` から `count` バイトを 0xFF で埋める
    pub fn fill_range(&mut self, offset: usize, count: usize, tag: Provenance) {
        let end = offset + count;
        self.grow_to(end);
        self.data[offset..end].fill(FILL_BYTE);
        self.provenance[offset..end].fill(tag);
    }

    fn grow_to(&mut self, end: usize) {
        if end > self.data.len() {
            self.data.resize(end, FILL_BYTE);
            self.provenance.resize(end, Provenance::Fill);
        }
    }

    /// Explicit なバイト数
    pub fn explicit_len(&self) -> usize {
        self.provenance
            .iter()
            .filter(|&&p| p == Provenance::Explicit)
            .count()
    }

    /// 同じ由来が続く区間を先頭から順に列挙
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        for (pos, &tag) in self.provenance.iter().enumerate() {
            match regions.last_mut() {
                Some(last) if last.provenance == tag => last.range.end = pos + 1,
                _ => regions.push(Region {
                    range: pos..pos + 1,
                    provenance: tag,
                }),
            }
        }
        regions
    }

    /// 生データへの参照を取得
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_is_out_of_range() {
        let image = FirmwareImage::from_bytes(vec![1, 2, 3]);
        assert_eq!(image.read(1, 2).unwrap(), &[2, 3]);
        assert_eq!(image.read(3, 0).unwrap(), &[] as &[u8]);
        assert_eq!(
            image.read(2, 2),
            Err(BufferError::OutOfRange { offset: 2, count: 2, len: 3 })
        );
        assert!(image.read(usize::MAX, 2).is_err());
    }

    #[test]
    fn write_grows_and_leaves_gap_as_fill() {
        let mut image = FirmwareImage::new();
        image.write(4, &[0xAA, 0xBB], Provenance::Explicit);

        assert_eq!(image.len(), 6);
        assert_eq!(image.data(), &[0xFF, 0xFF, 0xFF, 0xFF, 0xAA, 0xBB]);
        assert_eq!(image.provenance(0), Some(Provenance::Fill));
        assert_eq!(image.provenance(4), Some(Provenance::Explicit));
        assert_eq!(image.provenance(6), None);
    }

    #[test]
    fn overwrite_keeps_untouched_tags() {
        let mut image = FirmwareImage::new();
        image.fill_range(0, 8, Provenance::Fill);
        image.write(2, &[1, 2], Provenance::Explicit);

        assert_eq!(image.len(), 8);
        let tags: Vec<_> = (0..8).filter_map(|i| image.provenance(i)).collect();
        use Provenance::*;
        assert_eq!(tags, vec![Fill, Fill, Explicit, Explicit, Fill, Fill, Fill, Fill]);
        assert_eq!(image.explicit_len(), 2);
    }

    #[test]
    fn regions_are_maximal_runs() {
        let mut image = FirmwareImage::from_bytes(vec![0; 4]);
        image.fill_range(4, 4, Provenance::Fill);
        image.write(8, &[1], Provenance::Explicit);

        let regions = image.regions();
        assert_eq!(
            regions,
            vec![
                Region { range: 0..4, provenance: Provenance::Explicit },
                Region { range: 4..8, provenance: Provenance::Fill },
                Region { range: 8..9, provenance: Provenance::Explicit },
            ]
        );
        assert!(FirmwareImage::new().regions().is_empty());
    }
}
