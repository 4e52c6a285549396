//! Domain Layer - 领域层
//!
//! 包含四个限界上下文:
//! - Media Context: 媒体地址预检
//! - Access Context: 域名 / Referer 门控
//! - Playback Context: 播放状态规则
//! - Share Context: 令牌编码与分享链接

pub mod access;
pub mod media;
pub mod playback;
pub mod share;
