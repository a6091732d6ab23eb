/// `(sum(bytes) + c) mod 256 == 0` を満たす `c` を返す
pub fn checksum(bytes: &[u8]) -> u8 {
    sum(bytes).wrapping_neg()
}

/// チェックサムを含むバイト列の総和が 0 (mod 256) かどうか
///
/// 空のバイト列は不正とみなす。
pub fn validate(bytes: &[u8]) -> bool {
    !bytes.is_empty() && sum(bytes) == 0
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}
