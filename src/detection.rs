//! 에러 검출 코드
//!
//! 페이로드 뒤에 체크섬을 붙이고(big-endian), 수신 측에서 다시 계산해 비교한다.
//!
//! | 코드   | 체크섬 길이 | 정의 |
//! |--------|-------------|------|
//! | Parity | 1 byte (0/1) | 전체 비트의 짝/홀 |
//! | CRC8   | 1 byte | poly 0x07, init 0, xorout 0 (CRC-8/SMBUS) |
//! | CRC16  | 2 bytes | poly 0x1021, init 0, xorout 0 (CRC-16/XMODEM) |
//! | CRC32  | 4 bytes | 표준 CRC-32 (IEEE) |
//!
//! Parity는 홀수 개의 비트 오류만 검출한다. 짝수 개 반전은 통과한다.

use std::fmt;
use std::str::FromStr;

use crc::{Crc, CRC_16_XMODEM, CRC_8_SMBUS};
use serde::{Deserialize, Serialize};

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::error::{ConfigError, DetectionError};

const CRC_8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
const CRC_16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// 검출 코드 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionCodec {
    Parity,
    Crc8,
    Crc16,
    Crc32,
}

impl DetectionCodec {
    pub const ALL: [DetectionCodec; 4] = [Self::Parity, Self::Crc8, Self::Crc16, Self::Crc32];

    /// 붙는 체크섬 바이트 수
    pub fn checksum_len(&self) -> usize {
        match self {
            Self::Parity | Self::Crc8 => 1,
            Self::Crc16 => 2,
            Self::Crc32 => 4,
        }
    }

    /// 체크섬 계산 (부수효과 없음)
    pub fn calculate_checksum(&self, payload: &[u8]) -> u32 {
        match self {
            Self::Parity => {
                let ones: u32 = payload.iter().map(|b| b.count_ones()).sum();
                ones % 2
            }
            Self::Crc8 => CRC_8.checksum(payload) as u32,
            Self::Crc16 => CRC_16.checksum(payload) as u32,
            Self::Crc32 => crc32fast::hash(payload),
        }
    }

    /// payload ‖ checksum
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let checksum = self.calculate_checksum(payload).to_be_bytes();
        let len = self.checksum_len();

        let mut buf = Vec::with_capacity(payload.len() + len);
        buf.extend_from_slice(payload);
        buf.extend_from_slice(&checksum[4 - len..]);
        buf
    }

    /// 체크섬 검증 후 페이로드 반환
    pub fn decode<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], DetectionError> {
        let len = self.checksum_len();
        if data.len() < len {
            return Err(DetectionError::TooShort {
                required: len,
                actual: data.len(),
            });
        }

        let (payload, trailer) = data.split_at(data.len() - len);
        let expected = trailer
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
        let actual = self.calculate_checksum(payload);

        if expected == actual {
            Ok(payload)
        } else {
            Err(DetectionError::Mismatch { expected, actual })
        }
    }

    /// 비트 단위 인코딩 (바이트 변환 후 `encode`)
    ///
    /// 8의 배수가 아닌 비트열은 거부한다. 패딩 비트가 페이로드로 되돌아오면 안 된다.
    pub fn encode_bits(&self, payload_bits: &[bool]) -> Result<Vec<bool>, DetectionError> {
        check_aligned(payload_bits)?;
        Ok(bytes_to_bits(&self.encode(&bits_to_bytes(payload_bits))))
    }

    /// 비트 단위 디코딩
    pub fn decode_bits(&self, bits: &[bool]) -> Result<Vec<bool>, DetectionError> {
        check_aligned(bits)?;
        let bytes = bits_to_bytes(bits);
        self.decode(&bytes).map(bytes_to_bits)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Parity => "parity",
            Self::Crc8 => "crc8",
            Self::Crc16 => "crc16",
            Self::Crc32 => "crc32",
        }
    }
}

fn check_aligned(bits: &[bool]) -> Result<(), DetectionError> {
    if bits.len() % 8 != 0 {
        return Err(DetectionError::Misaligned(bits.len()));
    }
    Ok(())
}

impl fmt::Display for DetectionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectionCodec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parity" => Ok(Self::Parity),
            "crc8" => Ok(Self::Crc8),
            "crc16" => Ok(Self::Crc16),
            "crc32" => Ok(Self::Crc32),
            other => Err(ConfigError::InvalidArgument(format!(
                "알 수 없는 검출 코드: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_INPUT: &[u8] = b"123456789";

    #[test]
    fn test_catalogue_check_values() {
        assert_eq!(DetectionCodec::Crc8.calculate_checksum(CHECK_INPUT), 0xF4);
        assert_eq!(DetectionCodec::Crc16.calculate_checksum(CHECK_INPUT), 0x31C3);
        assert_eq!(
            DetectionCodec::Crc32.calculate_checksum(CHECK_INPUT),
            0xCBF4_3926
        );
    }

    #[test]
    fn test_parity_checksum() {
        assert_eq!(DetectionCodec::Parity.calculate_checksum(&[]), 0);
        assert_eq!(DetectionCodec::Parity.calculate_checksum(&[0b0000_0111]), 1);
        assert_eq!(DetectionCodec::Parity.calculate_checksum(&[0x03, 0x80]), 1);
        assert_eq!(DetectionCodec::Parity.calculate_checksum(&[0xFF]), 0);
    }

    #[test]
    fn test_encode_layout_big_endian() {
        let payload = b"ABC";
        for codec in DetectionCodec::ALL {
            let encoded = codec.encode(payload);
            assert_eq!(encoded.len(), payload.len() + codec.checksum_len());
            assert_eq!(&encoded[..3], payload);
        }

        let encoded = DetectionCodec::Crc32.encode(CHECK_INPUT);
        assert_eq!(&encoded[9..], &[0xCB, 0xF4, 0x39, 0x26]);

        let encoded = DetectionCodec::Crc16.encode(CHECK_INPUT);
        assert_eq!(&encoded[9..], &[0x31, 0xC3]);
    }

    #[test]
    fn test_roundtrip_all_codecs() {
        let payloads: [&[u8]; 4] = [b"", b"A", b"Hello, ARQ!", &[0xFF; 64]];
        for codec in DetectionCodec::ALL {
            for payload in payloads {
                let encoded = codec.encode(payload);
                assert_eq!(codec.decode(&encoded), Ok(payload), "{}", codec);

                let bits = bytes_to_bits(payload);
                let encoded = codec.encode_bits(&bits).unwrap();
                let decoded = codec.decode_bits(&encoded).unwrap();
                assert_eq!(decoded, bits, "{}", codec);
            }
        }
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let payload = b"single bit sensitivity";
        for codec in DetectionCodec::ALL {
            let encoded = codec.encode(payload);
            for bit in 0..encoded.len() * 8 {
                let mut corrupted = encoded.clone();
                corrupted[bit / 8] ^= 0x80 >> (bit % 8);
                assert!(
                    codec.decode(&corrupted).is_err(),
                    "{} missed flip at bit {}",
                    codec,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_parity_misses_even_weight_errors() {
        // 알려진 한계: 두 비트 반전은 검출되지 않음
        let codec = DetectionCodec::Parity;
        let mut encoded = codec.encode(b"even");
        encoded[0] ^= 0b0000_0011;
        assert_eq!(codec.decode(&encoded), Ok(&b"fven"[..]));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            DetectionCodec::Crc32.decode(&[1, 2]),
            Err(DetectionError::TooShort {
                required: 4,
                actual: 2
            })
        );
        assert!(DetectionCodec::Parity.decode(&[]).is_err());
    }

    #[test]
    fn test_misaligned_bits_rejected() {
        let codec = DetectionCodec::Crc8;
        let mut bits = codec.encode_bits(&bytes_to_bits(b"xy")).unwrap();
        bits.push(false);
        assert_eq!(codec.decode_bits(&bits), Err(DetectionError::Misaligned(25)));
    }

    #[test]
    fn test_misaligned_payload_bits_rejected_on_encode() {
        for codec in DetectionCodec::ALL {
            assert_eq!(
                codec.encode_bits(&[true, true, false]),
                Err(DetectionError::Misaligned(3)),
                "{}",
                codec
            );
        }
        // 바이트 경계면 비트 수 그대로 복원
        let bits = bytes_to_bits(&[0b1100_0000]);
        let encoded = DetectionCodec::Crc8.encode_bits(&bits).unwrap();
        assert_eq!(DetectionCodec::Crc8.decode_bits(&encoded), Ok(bits));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("CRC16".parse::<DetectionCodec>(), Ok(DetectionCodec::Crc16));
        assert_eq!("parity".parse::<DetectionCodec>(), Ok(DetectionCodec::Parity));
        assert!("md5".parse::<DetectionCodec>().is_err());
    }
}
