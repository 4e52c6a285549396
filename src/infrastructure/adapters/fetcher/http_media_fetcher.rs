//! HTTP Media Fetcher - 通过 HTTP 拉取远程媒体
//!
//! 实现 MediaFetcherPort trait；每次拉取都受超时与取消令牌约束，
//! 并限制响应体大小。

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{FetchError, FetchedMedia, MediaFetcherPort};
use crate::domain::media::MediaLocator;

/// HTTP 拉取客户端配置
#[derive(Debug, Clone)]
pub struct HttpMediaFetcherConfig {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 响应体最大字节数
    pub max_bytes: u64,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpMediaFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 512 * 1024 * 1024,
            user_agent: format!("shieldplay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpMediaFetcherConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// HTTP 媒体拉取客户端
pub struct HttpMediaFetcher {
    client: Client,
    config: HttpMediaFetcherConfig,
}

impl HttpMediaFetcher {
    /// 创建新的拉取客户端
    pub fn new(config: HttpMediaFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to build HTTP client");
                FetchError::NetworkError { status: None }
            })?;

        Ok(Self { client, config })
    }

    async fn download(&self, locator: &MediaLocator) -> Result<FetchedMedia, FetchError> {
        let mut response = self
            .client
            .get(locator.url().clone())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NetworkError {
                status: Some(status.as_u16()),
            });
        }

        let limit = self.config.max_bytes;
        if let Some(size) = response.content_length() {
            if size > limit {
                return Err(FetchError::TooLarge { size, limit });
            }
        }

        // 逐块读取，超过上限立即中止
        let mut buffer = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_transport_error)? {
            let size = (buffer.len() + chunk.len()) as u64;
            if size > limit {
                return Err(FetchError::TooLarge { size, limit });
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(FetchedMedia {
            bytes: buffer.freeze(),
            mime_type: locator.extension().mime_type().to_string(),
        })
    }
}

/// 只保留粗粒度信息，原始错误仅写入 debug 日志
fn map_transport_error(e: reqwest::Error) -> FetchError {
    tracing::debug!(error = %e, "Media transport error");
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::NetworkError {
            status: e.status().map(|s| s.as_u16()),
        }
    }
}

#[async_trait]
impl MediaFetcherPort for HttpMediaFetcher {
    async fn fetch(
        &self,
        locator: &MediaLocator,
        cancel: &CancellationToken,
    ) -> Result<FetchedMedia, FetchError> {
        tracing::debug!(locator = %locator, "Fetching media");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.download(locator) => result,
        };

        match &result {
            Ok(media) => tracing::info!(
                size = media.bytes.len(),
                mime_type = %media.mime_type,
                "Media fetched"
            ),
            Err(e) => tracing::warn!(error = %e, "Media fetch failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn locator(server: &MockServer, route: &str) -> MediaLocator {
        MediaLocator::parse(&format!("{}{}", server.uri(), route)).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = HttpMediaFetcherConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_bytes, 512 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = serve(
            "/video.mp4",
            ResponseTemplate::new(200).set_body_bytes(b"frames".to_vec()),
        )
        .await;
        let fetcher = HttpMediaFetcher::new(HttpMediaFetcherConfig::default()).unwrap();

        let media = fetcher
            .fetch(&locator(&server, "/video.mp4"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(&media.bytes[..], b"frames");
        assert_eq!(media.mime_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let server = serve("/missing.mp3", ResponseTemplate::new(404)).await;
        let fetcher = HttpMediaFetcher::new(HttpMediaFetcherConfig::default()).unwrap();

        let err = fetcher
            .fetch(&locator(&server, "/missing.mp3"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::NetworkError { status: Some(404) });
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected() {
        let server = serve(
            "/big.webm",
            ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]),
        )
        .await;
        let fetcher =
            HttpMediaFetcher::new(HttpMediaFetcherConfig::default().with_max_bytes(16)).unwrap();

        let err = fetcher
            .fetch(&locator(&server, "/big.webm"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_fetch() {
        let server = serve(
            "/slow.mkv",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
        )
        .await;
        let fetcher = HttpMediaFetcher::new(HttpMediaFetcherConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetcher
            .fetch(&locator(&server, "/slow.mkv"), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Cancelled);
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = serve(
            "/slow.mov",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .await;
        let fetcher =
            HttpMediaFetcher::new(HttpMediaFetcherConfig::default().with_timeout(1)).unwrap();

        let err = fetcher
            .fetch(&locator(&server, "/slow.mov"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }
}
