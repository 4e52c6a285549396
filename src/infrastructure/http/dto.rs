//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{SessionSnapshot, ShareLinkResponse};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

/// 加载 / 恢复请求
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub position: f64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
pub struct TimeUpdateRequest {
    pub position: f64,
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponseDto {
    pub restored: bool,
    pub state: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponseDto {
    pub released: bool,
}

#[derive(Debug, Serialize)]
pub struct ShareLinkDto {
    pub token: String,
    pub url: String,
    pub created_at: String,
}

impl From<ShareLinkResponse> for ShareLinkDto {
    fn from(link: ShareLinkResponse) -> Self {
        Self {
            token: link.token,
            url: link.url,
            created_at: link.created_at,
        }
    }
}
