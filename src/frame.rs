//! 프레임과 패킷 분할
//!
//! - Frame: 패킷 번호 + 원본 페이로드 + 채널 손상 전에 고정한 체크섬
//! - FrameBuilder: 바이트 스트림을 고정 크기 패킷 프레임들로 분할
//!
//! 프레임은 전송되지 않는다. 복구된 페이로드를 검증하는 기준값으로만 쓰인다.

use bytes::Bytes;

use crate::detection::DetectionCodec;

/// 패킷 번호 (1부터 시작)
pub type SequenceNumber = u64;

/// 패킷 프레임
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 패킷 번호
    pub sequence: SequenceNumber,

    /// 원본 페이로드
    pub payload: Bytes,

    /// 체크섬을 계산한 검출 코드
    pub detection: DetectionCodec,

    /// 원본 페이로드의 체크섬
    pub checksum: u32,
}

impl Frame {
    /// 새 프레임 생성 (체크섬 고정)
    pub fn create(sequence: SequenceNumber, payload: Bytes, detection: DetectionCodec) -> Self {
        let checksum = detection.calculate_checksum(&payload);

        Self {
            sequence,
            payload,
            detection,
            checksum,
        }
    }

    /// 복구된 페이로드가 원본 체크섬과 일치하는지
    pub fn verify(&self, candidate: &[u8]) -> bool {
        self.detection.calculate_checksum(candidate) == self.checksum
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// 프레임 생성기
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    packet_size: usize,
    detection: DetectionCodec,
}

impl FrameBuilder {
    pub fn new(packet_size: usize, detection: DetectionCodec) -> Self {
        Self {
            packet_size,
            detection,
        }
    }

    /// 패킷 수 계산
    pub fn packet_count(&self, data_len: usize) -> usize {
        data_len.div_ceil(self.packet_size)
    }

    /// 데이터를 프레임들로 분할 (마지막 패킷은 짧을 수 있음)
    pub fn split_into_frames(&self, data: &[u8]) -> Vec<Frame> {
        data.chunks(self.packet_size)
            .enumerate()
            .map(|(idx, packet)| {
                Frame::create(
                    idx as SequenceNumber + 1,
                    Bytes::copy_from_slice(packet),
                    self.detection,
                )
            })
            .collect()
    }
}
