//! Share Link - 外部分享链接
//!
//! 格式: `<base>?token=<token>&media=<encode(locator)>`

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;

use super::{codec, ShareLinkError, ShareToken};

pub const TOKEN_PARAM: &str = "token";
pub const MEDIA_PARAM: &str = "media";

/// 分享链接（派生值，不单独持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    pub token: String,
    pub composed_url: String,
    pub created_at: DateTime<Utc>,
}

/// 分享链接组装器
#[derive(Debug, Clone)]
pub struct ShareLinkBuilder {
    base_url: Url,
}

impl ShareLinkBuilder {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn parse(base_url: &str) -> Result<Self, ShareLinkError> {
        Url::parse(base_url)
            .map(Self::new)
            .map_err(|e| ShareLinkError::InvalidSharedLink(e.to_string()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 组装分享链接；纯函数，不访问网络
    pub fn build(
        &self,
        token: &ShareToken,
        locator: &str,
        created_at: DateTime<Utc>,
    ) -> ShareLink {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair(TOKEN_PARAM, token.as_str())
            .append_pair(MEDIA_PARAM, &codec::encode(locator));

        ShareLink {
            token: token.as_str().to_string(),
            composed_url: url.to_string(),
            created_at,
        }
    }
}

/// 解析得到的入站分享信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingShare {
    pub token: ShareToken,
    pub encoded_media: String,
    locator: String,
}

impl IncomingShare {
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// 解析外部链接
///
/// - 缺少 `token` 或 `media` 参数: `NotAShareLink`
/// - 参数存在但无法解码或二者不一致: `InvalidSharedLink`
pub fn parse_incoming(external_url: &str) -> Result<IncomingShare, ShareLinkError> {
    let url = Url::parse(external_url.trim()).map_err(|_| ShareLinkError::NotAShareLink)?;

    let mut token = None;
    let mut media = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            TOKEN_PARAM => token = Some(value.into_owned()),
            MEDIA_PARAM => media = Some(value.into_owned()),
            _ => {}
        }
    }

    let (Some(token), Some(encoded_media)) = (token, media) else {
        return Err(ShareLinkError::NotAShareLink);
    };

    let locator = codec::decode(&encoded_media)?;
    let token = ShareToken::parse(&token)?;
    if token.locator()? != locator {
        return Err(ShareLinkError::InvalidSharedLink(
            "token does not match media".to_string(),
        ));
    }

    Ok(IncomingShare {
        token,
        encoded_media,
        locator,
    })
}
