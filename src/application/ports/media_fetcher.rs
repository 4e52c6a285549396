//! Media Fetcher Port - 远程媒体拉取抽象
//!
//! 定义拉取远程媒体字节的接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::media::MediaLocator;

/// 拉取错误
///
/// 网络错误只保留粗粒度的状态码，不透出底层传输细节
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error (status: {status:?})")]
    NetworkError { status: Option<u16> },

    #[error("Request timeout")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Media too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// 拉取结果
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Media Fetcher Port
#[async_trait]
pub trait MediaFetcherPort: Send + Sync {
    /// 拉取媒体字节
    ///
    /// `cancel` 被触发时必须尽快以 `FetchError::Cancelled` 返回
    async fn fetch(
        &self,
        locator: &MediaLocator,
        cancel: &CancellationToken,
    ) -> Result<FetchedMedia, FetchError>;
}
