//! # ARQ Sim
//!
//! 잡음 채널 위의 검출/정정 계층형 재전송(ARQ) 시뮬레이터
//!
//! ## 핵심 특징
//! - **채널 모델**: 무기억 BSC, 2-상태 Gilbert-Elliott 버스트 채널
//! - **검출 코드**: Parity, CRC8, CRC16, CRC32
//! - **정정 코드**: Reed-Solomon (GF(256)), 검출 실패 시에만 사용
//! - **재전송 상태 머신**: 패킷마다 최대 `max_retries`번 시도, 소진 시 노이즈로 대체
//! - **재현성**: 모든 난수는 시드 RNG에서 생성
//! - **통계**: 시도 횟수 히스토그램, 손실 수, 채널 상태 점유율

pub mod bits;
pub mod channel;
pub mod config;
pub mod correction;
pub mod delivery;
pub mod detection;
pub mod error;
pub mod frame;
pub mod gilbert_elliott;
pub mod stats;
pub mod stream;

pub use channel::{BinarySymmetricChannel, Channel, ChannelCounters, ChannelModel, SharedChannel};
pub use config::{ChannelConfig, Config};
pub use correction::CorrectionCodec;
pub use delivery::{Delivery, DeliveryController, RetryOutcome};
pub use detection::DetectionCodec;
pub use error::{ConfigError, CorrectionError, DetectionError, Error, Result};
pub use frame::{Frame, FrameBuilder, SequenceNumber};
pub use gilbert_elliott::{ChannelState, GilbertElliottChannel, GilbertElliottParams, StateOccupancy};
pub use stats::{DeliveryStatistics, RunReport};
pub use stream::SplitStream;

/// 기본 패킷 크기 (바이트)
pub const DEFAULT_PACKET_SIZE: usize = 64;

/// 패킷당 기본 최대 시도 횟수
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// 기본 Reed-Solomon 패리티 심볼 수
pub const DEFAULT_PARITY_SYMBOLS: usize = 30;

/// 기본 헤더 길이 (BMP 헤더 크기)
pub const DEFAULT_HEADER_LEN: usize = 54;
