//! Share Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("无效的令牌: {0}")]
    MalformedToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareLinkError {
    #[error("不是分享链接")]
    NotAShareLink,

    #[error("无效的分享链接: {0}")]
    InvalidSharedLink(String),
}

impl From<TokenError> for ShareLinkError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MalformedToken(msg) => ShareLinkError::InvalidSharedLink(msg),
        }
    }
}
