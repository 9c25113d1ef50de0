//! 스트림 입출력
//!
//! 파일 앞부분 `header_len` 바이트는 해석하지 않는 헤더로 떼어 두고,
//! 나머지 본문만 채널로 전송한다.

use std::fs;
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::Result;

/// 헤더와 본문으로 나뉜 스트림
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStream {
    pub header: Bytes,
    pub body: Bytes,
}

impl SplitStream {
    /// 메모리 데이터 분할 (헤더보다 짧으면 전체가 헤더, 본문은 비어 있음)
    pub fn split(data: Bytes, header_len: usize) -> Self {
        let at = header_len.min(data.len());
        let mut body = data;
        let header = body.split_to(at);
        Self { header, body }
    }

    /// 파일을 읽어 분할
    pub fn read(path: impl AsRef<Path>, header_len: usize) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!("{} 읽음: {} bytes", path.display(), data.len());
        Ok(Self::split(Bytes::from(data), header_len))
    }

    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 헤더 ‖ 본문을 파일로 기록
pub fn write_stream(path: impl AsRef<Path>, header: &[u8], body: &[u8]) -> Result<()> {
    let mut buf = BytesMut::with_capacity(header.len() + body.len());
    buf.put_slice(header);
    buf.put_slice(body);
    fs::write(path, &buf)?;
    Ok(())
}
