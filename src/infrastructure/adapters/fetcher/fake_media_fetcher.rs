//! Fake Media Fetcher - 用于测试的拉取实现
//!
//! 按地址返回预置的字节，不发起网络请求；可选的闸门让测试控制
//! 拉取何时完成。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{FetchError, FetchedMedia, MediaFetcherPort};
use crate::domain::media::MediaLocator;

/// Fake Media Fetcher
pub struct FakeMediaFetcher {
    media: DashMap<String, Bytes>,
    failures: DashMap<String, FetchError>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl FakeMediaFetcher {
    pub fn new() -> Self {
        Self {
            media: DashMap::new(),
            failures: DashMap::new(),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次拉取都要等到 `release_one` 放行
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 预置某地址的内容
    pub fn with_media(self, url: &str, bytes: impl Into<Bytes>) -> Self {
        self.media.insert(url.to_string(), bytes.into());
        self
    }

    /// 预置某地址的失败
    pub fn with_failure(self, url: &str, error: FetchError) -> Self {
        self.failures.insert(url.to_string(), error);
        self
    }

    /// 放行一次被闸门挡住的拉取
    pub fn release_one(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// 累计拉取次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcherPort for FakeMediaFetcher {
    async fn fetch(
        &self,
        locator: &MediaLocator,
        cancel: &CancellationToken,
    ) -> Result<FetchedMedia, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(locator = %locator, "FakeMediaFetcher: serving preset media");

        if let Some(gate) = &self.gate {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                permit = gate.acquire() => {
                    if let Ok(permit) = permit {
                        permit.forget();
                    }
                }
            }
        }
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let key = locator.as_str();
        if let Some(error) = self.failures.get(key) {
            return Err(error.clone());
        }

        match self.media.get(key) {
            Some(bytes) => Ok(FetchedMedia {
                bytes: bytes.clone(),
                mime_type: locator.extension().mime_type().to_string(),
            }),
            None => Err(FetchError::NetworkError { status: Some(404) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://cdn.example.com/clip.mp4";

    #[tokio::test]
    async fn test_serves_preset_media() {
        let fetcher = FakeMediaFetcher::new().with_media(URL, &b"frames"[..]);
        let locator = MediaLocator::parse(URL).unwrap();

        let media = fetcher.fetch(&locator, &CancellationToken::new()).await.unwrap();
        assert_eq!(&media.bytes[..], b"frames");
        assert_eq!(media.mime_type, "video/mp4");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let fetcher = FakeMediaFetcher::new();
        let locator = MediaLocator::parse(URL).unwrap();

        let err = fetcher.fetch(&locator, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, FetchError::NetworkError { status: Some(404) });
    }

    #[tokio::test]
    async fn test_gate_holds_until_released_or_cancelled() {
        let fetcher = FakeMediaFetcher::gated().with_media(URL, &b"frames"[..]).arc();
        let locator = MediaLocator::parse(URL).unwrap();
        let cancel = CancellationToken::new();

        let task = {
            let fetcher = fetcher.clone();
            let locator = locator.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { fetcher.fetch(&locator, &cancel).await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        cancel.cancel();
        assert_eq!(task.await.unwrap().unwrap_err(), FetchError::Cancelled);

        fetcher.release_one();
        let media = fetcher.fetch(&locator, &CancellationToken::new()).await.unwrap();
        assert_eq!(&media.bytes[..], b"frames");
    }
}
