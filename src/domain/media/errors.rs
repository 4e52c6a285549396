//! Media Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("媒体地址不能为空")]
    EmptyLocator,

    #[error("无效的媒体地址: {0}")]
    MalformedLocator(String),

    #[error("不支持的媒体格式: {0}")]
    UnsupportedExtension(String),

    #[error("无法识别的媒体来源: {0}")]
    UnrecognizedSource(String),
}
