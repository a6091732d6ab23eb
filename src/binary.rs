//! 生バイナリの読み書き

use crate::buffer::FirmwareImage;

/// バイト列をそのままイメージにする（全バイト Explicit）
pub fn load_binary(bytes: &[u8]) -> FirmwareImage {
    FirmwareImage::from_bytes(bytes.to_vec())
}

/// イメージをアドレス順のバイト列にする（由来は無視）
pub fn save_binary(image: &FirmwareImage) -> Vec<u8> {
    image.data().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Provenance;
    use proptest::prelude::*;

    #[test]
    fn load_marks_everything_explicit() {
        let image = load_binary(&[0xFF, 0x00, 0xFF]);
        assert_eq!(image.len(), 3);
        assert_eq!(image.explicit_len(), 3);
    }

    #[test]
    fn save_includes_fill_bytes() {
        let mut image = FirmwareImage::new();
        image.write(2, &[0x12], Provenance::Explicit);
        assert_eq!(save_binary(&image), vec![0xFF, 0xFF, 0x12]);
    }

    proptest! {
        #[test]
        fn binary_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let image = load_binary(&bytes);
            let reloaded = load_binary(&save_binary(&image));
            prop_assert_eq!(reloaded.data(), image.data());
        }
    }
}
