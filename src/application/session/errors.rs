//! Session Errors - 会话层错误分类

use thiserror::Error;

use crate::application::ports::{FetchError, ResourceError, SurfaceError};
use crate::domain::access::DenyReason;
use crate::domain::media::MediaError;
use crate::domain::playback::PlaybackError;
use crate::domain::share::{ShareLinkError, TokenError};

/// 会话错误
///
/// 任何错误都不会使宿主崩溃；失败后状态总是落在 Idle 或原先的会话上。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    InputValidation(#[from] MediaError),

    #[error("Access denied: {0}")]
    AccessDenied(DenyReason),

    #[error("Network error (status: {status:?})")]
    Network { status: Option<u16> },

    #[error("Load timed out")]
    Timeout,

    #[error("Load cancelled")]
    Cancelled,

    #[error("Media too large")]
    MediaTooLarge,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid shared link: {0}")]
    InvalidSharedLink(String),

    #[error("A load is already in progress")]
    LoadInProgress,

    #[error("No active session")]
    NoActiveSession,

    #[error("Resource released: {0}")]
    ResourceReleased(String),

    #[error("Invalid volume: {0}")]
    InvalidVolume(f64),

    #[error("Surface error: {0}")]
    Surface(String),
}

impl SessionError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            Self::InputValidation(e) => e.to_string(),
            Self::AccessDenied(reason) => format!("访问被拒绝：{}", reason),
            Self::Network { status: Some(code) } => {
                format!("媒体加载失败（HTTP {}），请检查链接后重试", code)
            }
            Self::Network { status: None } => "媒体加载失败，请检查网络后重试".to_string(),
            Self::Timeout => "媒体加载超时，请稍后重试".to_string(),
            Self::Cancelled => "加载已取消".to_string(),
            Self::MediaTooLarge => "媒体文件过大".to_string(),
            Self::MalformedToken(_) => "无效的分享令牌".to_string(),
            Self::InvalidSharedLink(_) => "无效的分享链接".to_string(),
            Self::LoadInProgress => "正在加载中，请稍候".to_string(),
            Self::NoActiveSession => "当前没有播放会话".to_string(),
            Self::ResourceReleased(_) => "媒体资源已释放".to_string(),
            Self::InvalidVolume(_) => "音量必须在 0 到 1 之间".to_string(),
            Self::Surface(_) => "播放器不可用".to_string(),
        }
    }

    /// 是否需要展示提示（契约类错误直接作为被拒绝的操作返回）
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::LoadInProgress
                | Self::NoActiveSession
                | Self::ResourceReleased(_)
                | Self::InvalidVolume(_)
                | Self::Cancelled
        )
    }
}

impl From<FetchError> for SessionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NetworkError { status } => Self::Network { status },
            FetchError::Timeout => Self::Timeout,
            FetchError::Cancelled => Self::Cancelled,
            FetchError::TooLarge { .. } => Self::MediaTooLarge,
        }
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MalformedToken(msg) => Self::MalformedToken(msg),
        }
    }
}

impl From<ShareLinkError> for SessionError {
    fn from(err: ShareLinkError) -> Self {
        match err {
            ShareLinkError::NotAShareLink => Self::InvalidSharedLink("not a share link".to_string()),
            ShareLinkError::InvalidSharedLink(msg) => Self::InvalidSharedLink(msg),
        }
    }
}

impl From<ResourceError> for SessionError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::ResourceReleased(reference) => Self::ResourceReleased(reference),
        }
    }
}

impl From<SurfaceError> for SessionError {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err.to_string())
    }
}

impl From<PlaybackError> for SessionError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::InvalidVolume(v) => Self::InvalidVolume(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_message_only_carries_status() {
        let err = SessionError::from(FetchError::NetworkError { status: Some(404) });
        assert_eq!(err, SessionError::Network { status: Some(404) });
        assert!(err.user_message().contains("404"));
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_contract_violations_are_not_user_facing() {
        assert!(!SessionError::LoadInProgress.is_user_facing());
        assert!(!SessionError::NoActiveSession.is_user_facing());
        assert!(!SessionError::InvalidVolume(2.0).is_user_facing());
    }
}
