//! 채널 모델
//!
//! - BSC: 비트별 독립 반전 (무기억)
//! - Gilbert-Elliott: 2-상태 마르코프 버스트 에러 (`gilbert_elliott` 모듈)
//!
//! 모든 난수는 생성 시 주입된 RNG에서 나온다. 같은 시드, 같은 입력이면 출력도 같다.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::config::{check_probability, ChannelConfig};
use crate::gilbert_elliott::{GilbertElliottChannel, StateOccupancy};
use crate::Result;

/// 채널 전송 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCounters {
    /// 전송된 단위 수 (BSC는 비트, Gilbert-Elliott은 호출 API의 단위)
    pub transmitted_units: u64,

    /// 손상된 단위 수
    pub corrupted_units: u64,
}

impl ChannelCounters {
    /// 관측된 단위 에러율
    pub fn error_rate(&self) -> f64 {
        if self.transmitted_units == 0 {
            0.0
        } else {
            self.corrupted_units as f64 / self.transmitted_units as f64
        }
    }
}

/// 손상 채널 공통 인터페이스
pub trait ChannelModel {
    /// 비트열 전송. 입력과 같은 길이를 반환한다.
    fn transmit_bits(&mut self, bits: &[bool]) -> Vec<bool>;

    /// 바이트열 전송. 입력과 같은 길이를 반환한다.
    fn transmit_bytes(&mut self, data: &[u8]) -> Vec<u8>;

    /// 상태별 점유 통계 (버스트 채널만)
    fn occupancy(&self) -> Option<StateOccupancy> {
        None
    }

    fn counters(&self) -> ChannelCounters;

    /// 로그용 채널 이름
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Binary Symmetric Channel
#[derive(Debug, Clone)]
pub struct BinarySymmetricChannel<R = ChaCha8Rng> {
    crossover_probability: f64,
    rng: R,
    counters: ChannelCounters,
}

impl<R: RngCore> BinarySymmetricChannel<R> {
    pub fn new(crossover_probability: f64, rng: R) -> Result<Self> {
        check_probability("crossover_probability", crossover_probability)?;

        Ok(Self {
            crossover_probability,
            rng,
            counters: ChannelCounters::default(),
        })
    }

    pub fn crossover_probability(&self) -> f64 {
        self.crossover_probability
    }
}

impl<R: RngCore> ChannelModel for BinarySymmetricChannel<R> {
    fn transmit_bits(&mut self, bits: &[bool]) -> Vec<bool> {
        bits.iter()
            .map(|&bit| {
                self.counters.transmitted_units += 1;
                if self.rng.gen::<f64>() < self.crossover_probability {
                    self.counters.corrupted_units += 1;
                    !bit
                } else {
                    bit
                }
            })
            .collect()
    }

    fn transmit_bytes(&mut self, data: &[u8]) -> Vec<u8> {
        let noisy = self.transmit_bits(&bytes_to_bits(data));
        bits_to_bytes(&noisy)
    }

    fn counters(&self) -> ChannelCounters {
        self.counters
    }

    fn name(&self) -> &'static str {
        "BSC"
    }
}

/// 설정으로 선택되는 채널
#[derive(Debug, Clone)]
pub enum Channel<R = ChaCha8Rng> {
    Bsc(BinarySymmetricChannel<R>),
    GilbertElliott(GilbertElliottChannel<R>),
}

impl<R: RngCore> Channel<R> {
    /// 설정과 주입된 RNG로 채널 생성
    pub fn from_config(config: &ChannelConfig, rng: R) -> Result<Self> {
        match *config {
            ChannelConfig::Bsc {
                crossover_probability,
            } => Ok(Self::Bsc(BinarySymmetricChannel::new(
                crossover_probability,
                rng,
            )?)),
            ChannelConfig::GilbertElliott(params) => {
                Ok(Self::GilbertElliott(GilbertElliottChannel::new(params, rng)?))
            }
        }
    }
}

impl Channel<ChaCha8Rng> {
    /// ChaCha8 시드 RNG로 채널 생성
    pub fn seeded(config: &ChannelConfig, seed: u64) -> Result<Self> {
        Self::from_config(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> ChannelModel for Channel<R> {
    fn transmit_bits(&mut self, bits: &[bool]) -> Vec<bool> {
        match self {
            Self::Bsc(ch) => ch.transmit_bits(bits),
            Self::GilbertElliott(ch) => ch.transmit_bits(bits),
        }
    }

    fn transmit_bytes(&mut self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Bsc(ch) => ch.transmit_bytes(data),
            Self::GilbertElliott(ch) => ch.transmit_bytes(data),
        }
    }

    fn occupancy(&self) -> Option<StateOccupancy> {
        match self {
            Self::Bsc(ch) => ch.occupancy(),
            Self::GilbertElliott(ch) => ch.occupancy(),
        }
    }

    fn counters(&self) -> ChannelCounters {
        match self {
            Self::Bsc(ch) => ch.counters(),
            Self::GilbertElliott(ch) => ch.counters(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Bsc(ch) => ch.name(),
            Self::GilbertElliott(ch) => ch.name(),
        }
    }
}

/// 여러 호출자가 공유하는 채널 (뮤텍스로 직렬화)
///
/// 마르코프 상태는 락 획득 순서대로 단위를 관측한다.
pub struct SharedChannel<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SharedChannel<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: ChannelModel> SharedChannel<C> {
    pub fn new(channel: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(channel)),
        }
    }

    /// 락을 잡은 채로 내부 채널에 접근
    pub fn with<T>(&self, f: impl FnOnce(&mut C) -> T) -> T {
        let mut channel = self.inner.lock();
        f(&mut channel)
    }
}

impl<C: ChannelModel> ChannelModel for SharedChannel<C> {
    fn transmit_bits(&mut self, bits: &[bool]) -> Vec<bool> {
        self.inner.lock().transmit_bits(bits)
    }

    fn transmit_bytes(&mut self, data: &[u8]) -> Vec<u8> {
        self.inner.lock().transmit_bytes(data)
    }

    fn occupancy(&self) -> Option<StateOccupancy> {
        self.inner.lock().occupancy()
    }

    fn counters(&self) -> ChannelCounters {
        self.inner.lock().counters()
    }

    fn name(&self) -> &'static str {
        self.inner.lock().name()
    }
}
