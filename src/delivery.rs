//! 전달 제어기 (ARQ 상태 머신)
//!
//! 패킷마다:
//! 1. 검출 코드로 인코딩 → 채널 전송 → 검출 디코딩
//! 2. 성공하면 바로 수락 (DeliveredDirect)
//! 3. 실패하면 Reed-Solomon 패리티를 같은 채널로 따로 전송하고,
//!    수신 페이로드 ‖ 수신 패리티를 정정 → 다시 검출 디코딩 + 프레임 체크섬 확인
//!    (DeliveredViaCorrection)
//! 4. `max_retries`번 모두 실패하면 같은 길이의 난수 바이트로 대체 (Lost)
//!
//! 시도 하나는 검출 코드 페이로드와 패리티를 모두 새로 전송한다.
//! 이전 시도의 손상을 재사용하지 않는다.

use bytes::{Bytes, BytesMut};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::channel::{Channel, ChannelModel};
use crate::config::Config;
use crate::correction::CorrectionCodec;
use crate::frame::{Frame, FrameBuilder, SequenceNumber};
use crate::stats::{DeliveryStatistics, RunReport};
use crate::Result;

/// 대체 노이즈용 RNG 스트림 번호 (채널 RNG와 분리)
const NOISE_STREAM: u64 = 0x4E4F_4953_45; // "NOISE"

/// 패킷 최종 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// 검출 코드만으로 수락
    DeliveredDirect { attempts: u32 },

    /// 정정 코드로 복구 후 수락
    DeliveredViaCorrection { attempts: u32 },

    /// 재시도 소진
    Lost { attempts: u32 },
}

impl RetryOutcome {
    /// 결과가 확정된 시도 번호
    pub fn attempts(&self) -> u32 {
        match *self {
            Self::DeliveredDirect { attempts }
            | Self::DeliveredViaCorrection { attempts }
            | Self::Lost { attempts } => attempts,
        }
    }

    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Lost { .. })
    }
}

/// 패킷 하나의 전달 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sequence: SequenceNumber,
    pub outcome: RetryOutcome,

    /// 복구된 페이로드 (손실이면 노이즈)
    pub payload: Bytes,
}

/// 패킷별 상태
#[derive(Debug)]
enum DeliveryState {
    Pending,
    Attempting {
        attempt: u32,
    },
    Verifying {
        attempt: u32,
        wire: Vec<u8>,
        received: Vec<u8>,
    },
    CorrectionAttempt {
        attempt: u32,
        wire: Vec<u8>,
        received: Vec<u8>,
    },
    CorrectionVerifying {
        attempt: u32,
        corrected: Vec<u8>,
    },
    DeliveredDirect {
        attempt: u32,
        payload: Bytes,
    },
    DeliveredViaCorrection {
        attempt: u32,
        payload: Bytes,
    },
    Lost,
}

impl DeliveryState {
    fn name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Attempting { .. } => "Attempting",
            Self::Verifying { .. } => "Verifying",
            Self::CorrectionAttempt { .. } => "CorrectionAttempt",
            Self::CorrectionVerifying { .. } => "CorrectionVerifying",
            Self::DeliveredDirect { .. } => "DeliveredDirect",
            Self::DeliveredViaCorrection { .. } => "DeliveredViaCorrection",
            Self::Lost => "Lost",
        }
    }
}

/// 전달 제어기
///
/// 채널 하나를 스트림 전체에서 공유한다. 버스트 채널의 상태는 패킷 사이에 유지된다.
pub struct DeliveryController<C = Channel, R = ChaCha8Rng> {
    /// 설정
    config: Config,

    /// 채널
    channel: C,

    /// 정정 코덱
    correction: CorrectionCodec,

    /// 프레임 생성기
    frames: FrameBuilder,

    /// 손실 패킷 대체용 RNG
    noise_rng: R,

    /// 전달 통계
    stats: DeliveryStatistics,
}

impl DeliveryController<Channel, ChaCha8Rng> {
    /// 설정의 시드로 채널과 노이즈 RNG를 만들어 생성
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let channel = Channel::seeded(&config.channel, config.seed)?;
        let mut noise_rng = ChaCha8Rng::seed_from_u64(config.seed);
        noise_rng.set_stream(NOISE_STREAM);

        Self::with_parts(config, channel, noise_rng)
    }
}

impl<C: ChannelModel, R: RngCore> DeliveryController<C, R> {
    /// 주입된 채널과 노이즈 RNG로 생성
    ///
    /// `config.channel`은 검증만 하고 쓰지 않는다. 전송은 주입된 `channel`이 맡는다.
    pub fn with_parts(config: Config, channel: C, noise_rng: R) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            correction: CorrectionCodec::new(config.parity_symbols)?,
            frames: FrameBuilder::new(config.packet_size, config.detection),
            stats: DeliveryStatistics::new(config.max_retries),
            config,
            channel,
            noise_rng,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// 통계 반환
    pub fn statistics(&self) -> &DeliveryStatistics {
        &self.stats
    }

    /// 실행 결과 보고서
    pub fn report(&self) -> RunReport {
        RunReport {
            statistics: self.stats.clone(),
            occupancy: self.channel.occupancy(),
            channel: self.channel.counters(),
        }
    }

    /// 헤더 ‖ 복구된 본문 반환 (항상 입력과 같은 길이)
    pub fn run(&mut self, header: &[u8], body: &[u8]) -> Bytes {
        let frames = self.frames.split_into_frames(body);

        info!(
            "스트림 전송 시작: {} bytes, {} 패킷, 채널={}, 검출={}",
            body.len(),
            frames.len(),
            self.channel.name(),
            self.config.detection
        );

        let mut output = BytesMut::with_capacity(header.len() + body.len());
        output.extend_from_slice(header);

        for frame in &frames {
            let delivery = self.deliver(frame);
            output.extend_from_slice(&delivery.payload);
        }

        info!("{}", self.stats.summary());
        output.freeze()
    }

    /// 패킷 하나 전달 (통계 기록 포함)
    pub fn deliver(&mut self, frame: &Frame) -> Delivery {
        let mut state = DeliveryState::Pending;

        let (outcome, payload) = loop {
            trace!(sequence = frame.sequence, state = state.name());

            state = match state {
                DeliveryState::DeliveredDirect { attempt, payload } => {
                    break (RetryOutcome::DeliveredDirect { attempts: attempt }, payload);
                }
                DeliveryState::DeliveredViaCorrection { attempt, payload } => {
                    break (
                        RetryOutcome::DeliveredViaCorrection { attempts: attempt },
                        payload,
                    );
                }
                DeliveryState::Lost => {
                    warn!(
                        "패킷 {} 손실: {}회 시도 실패",
                        frame.sequence, self.config.max_retries
                    );
                    let noise = self.placeholder(frame.len());
                    break (
                        RetryOutcome::Lost {
                            attempts: self.config.max_retries,
                        },
                        noise,
                    );
                }
                other => self.step(frame, other),
            };
        };

        self.stats.record(&outcome);

        Delivery {
            sequence: frame.sequence,
            outcome,
            payload,
        }
    }

    /// 비종료 상태 하나 진행
    fn step(&mut self, frame: &Frame, state: DeliveryState) -> DeliveryState {
        let detection = self.config.detection;

        match state {
            DeliveryState::Pending => DeliveryState::Attempting { attempt: 1 },

            DeliveryState::Attempting { attempt } => {
                let wire = detection.encode(&frame.payload);
                let received = self.channel.transmit_bytes(&wire);
                DeliveryState::Verifying {
                    attempt,
                    wire,
                    received,
                }
            }

            DeliveryState::Verifying {
                attempt,
                wire,
                received,
            } => match detection.decode(&received).map(Bytes::copy_from_slice) {
                Ok(payload) => DeliveryState::DeliveredDirect { attempt, payload },
                Err(e) => {
                    debug!("패킷 {} 시도 {}: {}", frame.sequence, attempt, e);
                    DeliveryState::CorrectionAttempt {
                        attempt,
                        wire,
                        received,
                    }
                }
            },

            DeliveryState::CorrectionAttempt {
                attempt,
                wire,
                received,
            } => {
                // 패리티는 검출 코드가 붙은 페이로드 전체를 덮는다
                let parity = match self.correction.encode(&wire) {
                    Ok(parity) => parity,
                    Err(e) => {
                        warn!("패킷 {} 패리티 생성 실패: {}", frame.sequence, e);
                        return self.retry_or_lose(attempt);
                    }
                };
                let received_parity = self.channel.transmit_bytes(&parity);

                let mut codeword = received;
                codeword.extend_from_slice(&received_parity);

                match self.correction.decode(&codeword) {
                    Ok(corrected) => DeliveryState::CorrectionVerifying { attempt, corrected },
                    Err(e) => {
                        debug!("패킷 {} 시도 {}: {}", frame.sequence, attempt, e);
                        self.retry_or_lose(attempt)
                    }
                }
            }

            DeliveryState::CorrectionVerifying { attempt, corrected } => {
                match detection.decode(&corrected).map(Bytes::copy_from_slice) {
                    Ok(payload) if frame.verify(&payload) => {
                        DeliveryState::DeliveredViaCorrection { attempt, payload }
                    }
                    Ok(_) => {
                        debug!(
                            "패킷 {} 시도 {}: 정정 결과가 프레임 체크섬과 불일치",
                            frame.sequence, attempt
                        );
                        self.retry_or_lose(attempt)
                    }
                    Err(e) => {
                        debug!("패킷 {} 시도 {}: 정정 후 {}", frame.sequence, attempt, e);
                        self.retry_or_lose(attempt)
                    }
                }
            }

            terminal => terminal,
        }
    }

    fn retry_or_lose(&self, attempt: u32) -> DeliveryState {
        if attempt < self.config.max_retries {
            DeliveryState::Attempting {
                attempt: attempt + 1,
            }
        } else {
            DeliveryState::Lost
        }
    }

    /// 손실 패킷 대체 노이즈 (0 채움이 아닌 독립 난수)
    fn placeholder(&mut self, len: usize) -> Bytes {
        let mut noise = vec![0u8; len];
        self.noise_rng.fill_bytes(&mut noise);
        Bytes::from(noise)
    }
}
