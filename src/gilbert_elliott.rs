//! Gilbert-Elliott 버스트 에러 채널
//!
//! 2-상태 마르코프 과정. 전송 단위(바이트 또는 비트)마다:
//! 1. 현재 상태의 점유 카운터 증가
//! 2. 현재 상태의 에러 확률로 손상 여부 결정
//! 3. 독립적인 난수로 상태 전이 여부 결정
//!
//! 상태는 패킷 사이에 리셋되지 않는다. 스트림 전체에 걸친 버스트 상관을 표현한다.

use rand::{Rng, RngCore};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelCounters, ChannelModel};
use crate::config::check_probability;
use crate::error::ConfigError;
use crate::Result;

/// 채널 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    #[default]
    Good,
    Bad,
}

/// Gilbert-Elliott 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GilbertElliottParams {
    /// Good -> Bad 전이 확률
    pub good_to_bad: f64,

    /// Bad -> Good 전이 확률
    pub bad_to_good: f64,

    /// Good 상태의 단위 손상 확률
    pub good_error_prob: f64,

    /// Bad 상태의 단위 손상 확률
    pub bad_error_prob: f64,

    /// 시작 상태
    pub initial_state: ChannelState,
}

impl Default for GilbertElliottParams {
    fn default() -> Self {
        Self {
            good_to_bad: 0.05,
            bad_to_good: 0.1,
            good_error_prob: 0.01,
            bad_error_prob: 0.2,
            initial_state: ChannelState::Good,
        }
    }
}

impl GilbertElliottParams {
    /// 모든 확률이 [0, 1] 범위인지 확인
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_probability("good_to_bad", self.good_to_bad)?;
        check_probability("bad_to_good", self.bad_to_good)?;
        check_probability("good_error_prob", self.good_error_prob)?;
        check_probability("bad_error_prob", self.bad_error_prob)?;
        Ok(())
    }

    /// 정상 상태에서 Bad 상태에 머무는 비율 (전이가 없으면 None)
    pub fn stationary_bad_fraction(&self) -> Option<f64> {
        let total = self.good_to_bad + self.bad_to_good;
        if total == 0.0 {
            return None;
        }
        Some(self.good_to_bad / total)
    }
}

/// 상태별 점유 단위 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOccupancy {
    pub good_units: u64,
    pub bad_units: u64,
}

impl StateOccupancy {
    pub fn total(&self) -> u64 {
        self.good_units + self.bad_units
    }

    pub fn good_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.good_units as f64 / total as f64,
        }
    }

    pub fn bad_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.bad_units as f64 / total as f64,
        }
    }

    pub fn good_percent(&self) -> f64 {
        self.good_fraction() * 100.0
    }

    pub fn bad_percent(&self) -> f64 {
        self.bad_fraction() * 100.0
    }
}

/// Gilbert-Elliott 채널
///
/// # Thread Safety
/// 상태를 가지며 동기화하지 않는다. 여러 스레드에서 쓰려면 `SharedChannel`로 감쌀 것.
#[derive(Debug, Clone)]
pub struct GilbertElliottChannel<R = ChaCha8Rng> {
    params: GilbertElliottParams,
    state: ChannelState,
    rng: R,
    occupancy: StateOccupancy,
    corrupted_units: u64,
}

impl<R: RngCore> GilbertElliottChannel<R> {
    /// 새 채널 생성 (확률 검증 실패 시 에러)
    pub fn new(params: GilbertElliottParams, rng: R) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            state: params.initial_state,
            params,
            rng,
            occupancy: StateOccupancy::default(),
            corrupted_units: 0,
        })
    }

    pub fn params(&self) -> &GilbertElliottParams {
        &self.params
    }

    /// 현재 마르코프 상태
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// 현재 상태에 단위를 기록하고 손상 여부 결정
    fn enter_unit(&mut self) -> bool {
        let error_prob = match self.state {
            ChannelState::Good => {
                self.occupancy.good_units += 1;
                self.params.good_error_prob
            }
            ChannelState::Bad => {
                self.occupancy.bad_units += 1;
                self.params.bad_error_prob
            }
        };

        let corrupt = self.rng.gen::<f64>() < error_prob;
        if corrupt {
            self.corrupted_units += 1;
        }
        corrupt
    }

    /// 손상 결정 이후 별도 난수로 상태 전이
    fn advance_state(&mut self) {
        let (leave_prob, next) = match self.state {
            ChannelState::Good => (self.params.good_to_bad, ChannelState::Bad),
            ChannelState::Bad => (self.params.bad_to_good, ChannelState::Good),
        };

        if self.rng.gen::<f64>() < leave_prob {
            self.state = next;
        }
    }
}

impl<R: RngCore> ChannelModel for GilbertElliottChannel<R> {
    fn transmit_bits(&mut self, bits: &[bool]) -> Vec<bool> {
        bits.iter()
            .map(|&bit| {
                let out = if self.enter_unit() { !bit } else { bit };
                self.advance_state();
                out
            })
            .collect()
    }

    fn transmit_bytes(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .map(|&byte| {
                // 0이 아닌 마스크라서 손상이 선언되면 바이트는 반드시 바뀐다
                let out = if self.enter_unit() {
                    byte ^ self.rng.gen_range(1..=255u8)
                } else {
                    byte
                };
                self.advance_state();
                out
            })
            .collect()
    }

    fn occupancy(&self) -> Option<StateOccupancy> {
        Some(self.occupancy)
    }

    fn counters(&self) -> ChannelCounters {
        ChannelCounters {
            transmitted_units: self.occupancy.total(),
            corrupted_units: self.corrupted_units,
        }
    }

    fn name(&self) -> &'static str {
        "Gilbert-Elliott"
    }
}
