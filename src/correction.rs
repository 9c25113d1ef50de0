//! 에러 정정 코드 (Reed-Solomon, GF(256))
//!
//! 검출 실패 시 두 번째 방어선으로만 사용한다. 패리티 심볼 `k`개로 최대 `k/2`개
//! 심볼 오류를 정정한다.
//!
//! 디코더 결과는 수신 코드워드와 `k/2` 위치 이하로만 달라야 받아들인다.
//! 정정 반경 밖의 결과는 실패로 보고한다.

use std::fmt;

use reed_solomon::{Decoder, Encoder};

use crate::error::{ConfigError, CorrectionError};
use crate::Result;

/// GF(256) 최대 코드워드 길이
pub const MAX_CODEWORD_LEN: usize = 255;

/// Reed-Solomon 코덱
pub struct CorrectionCodec {
    parity_symbols: usize,
    encoder: Encoder,
    decoder: Decoder,
}

impl fmt::Debug for CorrectionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionCodec")
            .field("parity_symbols", &self.parity_symbols)
            .finish()
    }
}

impl CorrectionCodec {
    /// 패리티 심볼 수 `k`로 코덱 생성 (1 ~ 254)
    pub fn new(parity_symbols: usize) -> Result<Self> {
        if parity_symbols == 0 || parity_symbols >= MAX_CODEWORD_LEN {
            return Err(ConfigError::InvalidParitySymbols(parity_symbols).into());
        }

        Ok(Self {
            parity_symbols,
            encoder: Encoder::new(parity_symbols),
            decoder: Decoder::new(parity_symbols),
        })
    }

    pub fn parity_symbols(&self) -> usize {
        self.parity_symbols
    }

    /// 정정 가능한 최대 심볼 오류 수
    pub fn capacity(&self) -> usize {
        self.parity_symbols / 2
    }

    /// 한 코드워드에 담을 수 있는 최대 메시지 길이
    pub fn max_message_len(&self) -> usize {
        MAX_CODEWORD_LEN - self.parity_symbols
    }

    /// 메시지의 패리티 심볼 계산 (정확히 `k`개)
    pub fn encode(&self, message: &[u8]) -> Result<Vec<u8>> {
        if message.len() > self.max_message_len() {
            return Err(ConfigError::CodewordTooLong {
                message_len: message.len(),
                parity: self.parity_symbols,
                max: MAX_CODEWORD_LEN,
            }
            .into());
        }

        let encoded = self.encoder.encode(message);
        Ok(encoded.ecc().to_vec())
    }

    /// message ‖ parity 코드워드를 정정해 메시지 반환
    pub fn decode(&self, codeword: &[u8]) -> std::result::Result<Vec<u8>, CorrectionError> {
        if codeword.len() <= self.parity_symbols || codeword.len() > MAX_CODEWORD_LEN {
            return Err(CorrectionError::Malformed {
                len: codeword.len(),
                parity: self.parity_symbols,
                max: MAX_CODEWORD_LEN,
            });
        }

        let too_many = CorrectionError::TooManyErrors {
            capacity: self.capacity(),
        };

        let mut received = codeword.to_vec();
        let corrected = self
            .decoder
            .correct(&mut received[..], None)
            .map_err(|_| too_many.clone())?;

        // 유효한 코드워드인지 재인코딩으로 확인
        let message = corrected.data().to_vec();
        let reencoded = self.encoder.encode(&message);
        if reencoded.ecc() != corrected.ecc() {
            return Err(too_many);
        }

        // 정정 반경 확인
        let changed = reencoded
            .iter()
            .zip(codeword)
            .filter(|(a, b)| a != b)
            .count();
        if changed > self.capacity() {
            return Err(too_many);
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codeword(codec: &CorrectionCodec, message: &[u8]) -> Vec<u8> {
        let mut buf = message.to_vec();
        buf.extend(codec.encode(message).unwrap());
        buf
    }

    /// 서로 다른 위치 `count`개를 손상
    fn corrupt(buf: &mut [u8], count: usize) {
        let stride = buf.len() / count;
        for i in 0..count {
            buf[i * stride] ^= 0x5A;
        }
    }

    #[test]
    fn test_parity_length() {
        let codec = CorrectionCodec::new(30).unwrap();
        assert_eq!(codec.encode(b"hello").unwrap().len(), 30);
        assert_eq!(codec.encode(&[0u8; 200]).unwrap().len(), 30);
        assert_eq!(codec.capacity(), 15);
    }

    #[test]
    fn test_clean_codeword_decodes() {
        let codec = CorrectionCodec::new(10).unwrap();
        let message = b"Test data for Reed-Solomon coding.";
        let cw = codeword(&codec, message);
        assert_eq!(codec.decode(&cw).unwrap(), message.to_vec());
    }

    #[test]
    fn test_corrects_up_to_capacity() {
        let codec = CorrectionCodec::new(10).unwrap();
        let message: Vec<u8> = (0..20).collect();
        let clean = codeword(&codec, &message);

        for errors in 1..=codec.capacity() {
            let mut cw = clean.clone();
            corrupt(&mut cw, errors);
            assert_eq!(codec.decode(&cw).unwrap(), message, "errors = {}", errors);
        }
    }

    #[test]
    fn test_beyond_capacity_fails() {
        let codec = CorrectionCodec::new(10).unwrap();
        let message: Vec<u8> = (0..20).collect();
        let mut cw = codeword(&codec, &message);
        corrupt(&mut cw, codec.capacity() + 1);

        assert!(matches!(
            codec.decode(&cw),
            Err(CorrectionError::TooManyErrors { capacity: 5 })
        ));
    }

    #[test]
    fn test_full_inversion_fails() {
        let codec = CorrectionCodec::new(4).unwrap();
        let cw: Vec<u8> = codeword(&codec, &[0x41, 0x42, 0x43, 0x44, 0x00])
            .into_iter()
            .map(|b| !b)
            .collect();
        assert!(codec.decode(&cw).is_err());
    }

    #[test]
    fn test_oversized_message_rejected() {
        let codec = CorrectionCodec::new(30).unwrap();
        assert!(codec.encode(&[0u8; 225]).is_ok());
        assert!(codec.encode(&[0u8; 226]).is_err());
    }

    #[test]
    fn test_malformed_codeword() {
        let codec = CorrectionCodec::new(4).unwrap();
        assert!(matches!(
            codec.decode(&[1, 2, 3, 4]),
            Err(CorrectionError::Malformed { .. })
        ));
        assert!(matches!(
            codec.decode(&[0u8; 256]),
            Err(CorrectionError::Malformed { .. })
        ));
    }

    #[test]
    fn test_invalid_parity_count() {
        assert!(CorrectionCodec::new(0).is_err());
        assert!(CorrectionCodec::new(255).is_err());
        assert!(CorrectionCodec::new(64).is_ok());
    }
}
