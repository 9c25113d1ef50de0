//! 전송 통계

use serde::{Deserialize, Serialize};

use crate::channel::ChannelCounters;
use crate::delivery::RetryOutcome;
use crate::gilbert_elliott::StateOccupancy;
use crate::Result;

/// 패킷 전달 통계
///
/// 수락된 패킷은 수락된 시도 번호(1 ~ max_retries)에 기록되고, 손실 패킷은 따로 센다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatistics {
    /// 최대 시도 횟수
    pub max_retries: u32,

    /// 시도 번호별 수락 수 (인덱스 0 미사용)
    attempts: Vec<u64>,

    /// 검출 코드만으로 수락된 패킷 수
    pub direct_packets: u64,

    /// 정정 코드로 수락된 패킷 수
    pub corrected_packets: u64,

    /// 재시도 소진으로 손실된 패킷 수
    pub lost_packets: u64,
}

impl DeliveryStatistics {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            attempts: vec![0; max_retries as usize + 1],
            direct_packets: 0,
            corrected_packets: 0,
            lost_packets: 0,
        }
    }

    /// 패킷 결과 기록
    pub fn record(&mut self, outcome: &RetryOutcome) {
        match *outcome {
            RetryOutcome::DeliveredDirect { attempts } => {
                self.direct_packets += 1;
                self.record_attempt(attempts);
            }
            RetryOutcome::DeliveredViaCorrection { attempts } => {
                self.corrected_packets += 1;
                self.record_attempt(attempts);
            }
            RetryOutcome::Lost { .. } => {
                self.lost_packets += 1;
            }
        }
    }

    fn record_attempt(&mut self, attempts: u32) {
        if let Some(slot) = self.attempts.get_mut(attempts as usize) {
            *slot += 1;
        }
    }

    /// n번째 시도에서 수락된 패킷 수
    pub fn accepted_at(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return 0;
        }
        self.attempts.get(attempt as usize).copied().unwrap_or(0)
    }

    /// (시도 번호, 수락 수) 히스토그램
    pub fn histogram(&self) -> Vec<(u32, u64)> {
        (1..=self.max_retries)
            .map(|attempt| (attempt, self.accepted_at(attempt)))
            .collect()
    }

    /// 수락된 패킷 수
    pub fn accepted_packets(&self) -> u64 {
        self.attempts.iter().sum()
    }

    /// 전체 패킷 수
    pub fn total_packets(&self) -> u64 {
        self.accepted_packets() + self.lost_packets
    }

    /// 모든 시도를 사용한 패킷 수 (마지막 시도에서 수락 + 손실)
    pub fn exhausted_packets(&self) -> u64 {
        self.accepted_at(self.max_retries) + self.lost_packets
    }

    /// 패킷 손실률
    pub fn loss_rate(&self) -> f64 {
        let total = self.total_packets();
        if total == 0 {
            return 0.0;
        }
        self.lost_packets as f64 / total as f64
    }

    /// 수락된 패킷의 평균 시도 횟수
    pub fn mean_attempts(&self) -> f64 {
        let accepted = self.accepted_packets();
        if accepted == 0 {
            return 0.0;
        }
        let weighted: u64 = self
            .attempts
            .iter()
            .enumerate()
            .map(|(attempt, &count)| attempt as u64 * count)
            .sum();
        weighted as f64 / accepted as f64
    }

    /// 통계 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "Packets: {} | Direct: {} | Corrected: {} | Lost: {} ({:.2}%) | Mean attempts: {:.2} | Exhausted: {}",
            self.total_packets(),
            self.direct_packets,
            self.corrected_packets,
            self.lost_packets,
            self.loss_rate() * 100.0,
            self.mean_attempts(),
            self.exhausted_packets(),
        )
    }
}

impl Default for DeliveryStatistics {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MAX_RETRIES)
    }
}

/// 실행 결과 보고서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// 패킷 전달 통계
    pub statistics: DeliveryStatistics,

    /// Gilbert-Elliott 상태 점유 (BSC면 None)
    pub occupancy: Option<StateOccupancy>,

    /// 채널 전송/손상 단위 수
    pub channel: ChannelCounters,
}

impl RunReport {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
