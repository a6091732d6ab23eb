use super::record::{encode_line, ByteRecord};
use super::EncodeError;
use crate::buffer::{FirmwareImage, Provenance};

/// 書き出し設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// 1レコードあたりのデータバイト数
    pub bytes_per_record: u8,
    /// Fill 区間をレコードにしない
    pub skip_fill: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            bytes_per_record: 16,
            skip_fill: true,
        }
    }
}

/// イメージを Intel HEX テキストに変換
///
/// データレコードを並べ、最後に End Of File レコードを付ける。
pub fn encode(image: &FirmwareImage, options: &EncodeOptions) -> Result<String, EncodeError> {
    if options.bytes_per_record == 0 {
        return Err(EncodeError::InvalidRecordWidth);
    }
    let width = options.bytes_per_record as usize;

    let mut text = String::new();
    for region in image.regions() {
        if options.skip_fill && region.provenance == Provenance::Fill {
            continue;
        }

        for start in region.range.clone().step_by(width) {
            let end = (start + width).min(region.range.end);
            let address =
                u16::try_from(start).map_err(|_| EncodeError::AddressOverflow { offset: start })?;
            let payload = image.data()[start..end].to_vec();
            text.push_str(&encode_line(&ByteRecord::data(address, payload)?));
            text.push('\n');
        }
    }

    text.push_str(&encode_line(&ByteRecord::end_of_file()));
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ihex::decode;

    #[test]
    fn empty_image_is_just_eof() {
        let text = encode(&FirmwareImage::new(), &EncodeOptions::default()).unwrap();
        assert_eq!(text, ":00000001FF\n");
    }

    #[test]
    fn splits_into_records() {
        let image = FirmwareImage::from_bytes((0..40).collect());
        let text = encode(&image, &EncodeOptions::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(":10000000000102"));
        assert!(lines[1].starts_with(":10001000"));
        assert!(lines[2].starts_with(":08002000"));
        assert_eq!(lines[3], ":00000001FF");
    }

    #[test]
    fn fill_regions_are_skipped_and_restored_on_decode() {
        let mut image = FirmwareImage::new();
        image.write(0, &[0xAA, 0xBB, 0xCC, 0xDD], Provenance::Explicit);
        image.fill_range(4, 4, Provenance::Fill);
        image.write(8, &[0xEE, 0xFF], Provenance::Explicit);
        image.fill_range(10, 246, Provenance::Fill);

        let text = encode(&image, &EncodeOptions::default()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(decode(&text).unwrap(), image);
    }

    #[test]
    fn keep_fill_writes_every_byte() {
        let mut image = FirmwareImage::from_bytes(vec![1, 2]);
        image.fill_range(2, 2, Provenance::Fill);
        let options = EncodeOptions {
            bytes_per_record: 255,
            skip_fill: false,
        };
        let text = encode(&image, &options).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(decode(&text).unwrap().read(0, 4).unwrap(), &[1, 2, 0xFF, 0xFF]);
    }

    #[test]
    fn rejects_offsets_beyond_16_bits() {
        let image = FirmwareImage::from_bytes(vec![0; 0x10010]);
        assert_eq!(
            encode(&image, &EncodeOptions::default()),
            Err(EncodeError::AddressOverflow { offset: 0x10000 })
        );
    }

    #[test]
    fn rejects_zero_width() {
        let options = EncodeOptions {
            bytes_per_record: 0,
            ..EncodeOptions::default()
        };
        assert_eq!(
            encode(&FirmwareImage::new(), &options),
            Err(EncodeError::InvalidRecordWidth)
        );
    }
}
