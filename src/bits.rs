//! 바이트 <-> 비트 변환 (MSB 우선)

/// 바이트열을 비트열로 펼침
pub fn bytes_to_bits(data: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// 비트열을 바이트열로 재조립
///
/// 비트 수가 8의 배수가 아니면 마지막 바이트의 남는 자리는 0으로 채운다.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|group| {
            let byte = group
                .iter()
                .fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
            byte << (8 - group.len())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        let bits = bytes_to_bits(&[0b1010_0001]);
        assert_eq!(
            bits,
            vec![true, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_roundtrip() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(bits_to_bytes(&bytes_to_bits(&data)), data);
    }

    #[test]
    fn test_zero_padding() {
        // 3비트 [1, 1, 0] -> 0b1100_0000
        assert_eq!(bits_to_bytes(&[true, true, false]), vec![0xC0]);
        assert_eq!(bits_to_bytes(&[]), Vec::<u8>::new());
    }
}
