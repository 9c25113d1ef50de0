//! 에러 타입 정의
//!
//! 검출/정정 실패는 재전송 루프 안에서 처리되고, 설정 에러만 호출자에게 전파된다.

use thiserror::Error;

/// 시뮬레이터 최상위 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("설정 에러: {0}")]
    Config(#[from] ConfigError),

    #[error("검출 실패: {0}")]
    Detection(#[from] DetectionError),

    #[error("정정 실패: {0}")]
    Correction(#[from] CorrectionError),

    #[error("IO 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("직렬화 에러: {0}")]
    Serialization(#[from] bincode::Error),
}

/// 설정 에러 (전송 시작 전에만 발생)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("유효하지 않은 확률: {name}={value} (0.0 ~ 1.0 필요)")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("코드워드 길이 초과: message={message_len} + parity={parity} > {max}")]
    CodewordTooLong {
        message_len: usize,
        parity: usize,
        max: usize,
    },

    #[error("유효하지 않은 패킷 크기: {0}")]
    InvalidPacketSize(usize),

    #[error("유효하지 않은 최대 재시도 횟수: {0}")]
    InvalidMaxRetries(u32),

    #[error("유효하지 않은 패리티 심볼 수: {0} (1 ~ 254 필요)")]
    InvalidParitySymbols(usize),

    #[error("잘못된 인자: {0}")]
    InvalidArgument(String),
}

/// 검출 코드 디코딩 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("데이터 부족: 최소 {required} bytes 필요, {actual} bytes 수신")]
    TooShort { required: usize, actual: usize },

    #[error("체크섬 불일치: expected {expected:08X}, got {actual:08X}")]
    Mismatch { expected: u32, actual: u32 },

    #[error("바이트 경계가 아닌 비트 수: {0}")]
    Misaligned(usize),
}

/// 정정 코드 디코딩 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("잘못된 코드워드 길이: {len} (parity {parity}, 최대 {max})")]
    Malformed { len: usize, parity: usize, max: usize },

    #[error("정정 능력 초과 (최대 {capacity} 심볼)")]
    TooManyErrors { capacity: usize },
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
