//! Fetcher Adapter - 远程媒体拉取实现

mod fake_media_fetcher;
mod http_media_fetcher;

pub use fake_media_fetcher::FakeMediaFetcher;
pub use http_media_fetcher::*;
