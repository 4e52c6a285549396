//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::session::SessionError;

/// 应用层错误
///
/// 携带的文本即为面向用户的提示
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入校验失败（地址、令牌、分享链接、音量）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 访问门控拒绝
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 当前状态不允许该操作
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 远程拉取失败
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        let message = err.user_message();
        match err {
            SessionError::InputValidation(_)
            | SessionError::MalformedToken(_)
            | SessionError::InvalidSharedLink(_)
            | SessionError::InvalidVolume(_) => Self::ValidationError(message),
            SessionError::AccessDenied(_) => Self::AccessDenied(message),
            SessionError::LoadInProgress
            | SessionError::NoActiveSession
            | SessionError::ResourceReleased(_)
            | SessionError::Cancelled => Self::InvalidState(message),
            SessionError::Network { .. } | SessionError::Timeout | SessionError::MediaTooLarge => {
                Self::ExternalServiceError(message)
            }
            SessionError::Surface(_) => Self::InternalError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::DenyReason;

    #[test]
    fn test_session_errors_keep_user_message() {
        let err = ApplicationError::from(SessionError::Network { status: Some(502) });
        match err {
            ApplicationError::ExternalServiceError(msg) => assert!(msg.contains("502")),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(matches!(
            ApplicationError::from(SessionError::AccessDenied(DenyReason::NoReferrer)),
            ApplicationError::AccessDenied(_)
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::LoadInProgress),
            ApplicationError::InvalidState(_)
        ));
    }
}
