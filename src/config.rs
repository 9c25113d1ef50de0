//! 시뮬레이션 설정
//!
//! 전송 시작 전에 한 번 검증된다. 검증을 통과한 설정으로는 실행 중 설정 에러가 발생하지 않는다.

use serde::{Deserialize, Serialize};

use crate::correction::MAX_CODEWORD_LEN;
use crate::detection::DetectionCodec;
use crate::error::ConfigError;
use crate::gilbert_elliott::{ChannelState, GilbertElliottParams};
use crate::{
    DEFAULT_HEADER_LEN, DEFAULT_MAX_RETRIES, DEFAULT_PACKET_SIZE, DEFAULT_PARITY_SYMBOLS,
};

/// 확률 값 검증 ([0, 1], 유한값)
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

/// 채널 종류와 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelConfig {
    /// 무기억 비트 반전 채널
    Bsc { crossover_probability: f64 },

    /// 2-상태 버스트 채널
    GilbertElliott(GilbertElliottParams),
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::Bsc {
            crossover_probability: 0.001,
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Bsc {
                crossover_probability,
            } => check_probability("crossover_probability", *crossover_probability),
            Self::GilbertElliott(params) => params.validate(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bsc { .. } => "BSC",
            Self::GilbertElliott(_) => "Gilbert-Elliott",
        }
    }
}

/// 전송 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 채널 모델
    pub channel: ChannelConfig,

    /// 검출 코드
    pub detection: DetectionCodec,

    /// Reed-Solomon 패리티 심볼 수
    pub parity_symbols: usize,

    /// 패킷 크기 (바이트)
    pub packet_size: usize,

    /// 패킷당 최대 시도 횟수
    pub max_retries: u32,

    /// 해석하지 않고 그대로 앞에 붙이는 헤더 길이 (바이트)
    pub header_len: usize,

    /// 난수 시드
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            detection: DetectionCodec::Crc32,
            parity_symbols: DEFAULT_PARITY_SYMBOLS,
            packet_size: DEFAULT_PACKET_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            header_len: DEFAULT_HEADER_LEN,
            seed: 0,
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel.validate()?;

        if self.packet_size == 0 {
            return Err(ConfigError::InvalidPacketSize(self.packet_size));
        }

        if self.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(self.max_retries));
        }

        if self.parity_symbols == 0 || self.parity_symbols >= MAX_CODEWORD_LEN {
            return Err(ConfigError::InvalidParitySymbols(self.parity_symbols));
        }

        // 검출 코드가 붙은 가장 긴 패킷 + 패리티가 한 코드워드에 들어가야 함
        let message_len = self.packet_size + self.detection.checksum_len();
        if message_len + self.parity_symbols > MAX_CODEWORD_LEN {
            return Err(ConfigError::CodewordTooLong {
                message_len,
                parity: self.parity_symbols,
                max: MAX_CODEWORD_LEN,
            });
        }

        Ok(())
    }

    /// 무잡음 채널
    pub fn noiseless() -> Self {
        Self {
            channel: ChannelConfig::Bsc {
                crossover_probability: 0.0,
            },
            ..Self::default()
        }
    }

    /// 버스트 채널 기본값
    pub fn bursty() -> Self {
        Self {
            channel: ChannelConfig::GilbertElliott(GilbertElliottParams::default()),
            detection: DetectionCodec::Crc16,
            ..Self::default()
        }
    }

    /// 매우 나쁜 채널 (손실 관측용)
    pub fn harsh() -> Self {
        Self {
            channel: ChannelConfig::GilbertElliott(GilbertElliottParams {
                good_to_bad: 0.2,
                bad_to_good: 0.05,
                good_error_prob: 0.05,
                bad_error_prob: 0.5,
                initial_state: ChannelState::Good,
            }),
            detection: DetectionCodec::Crc32,
            ..Self::default()
        }
    }
}
