//! Shieldplay - 受保护的媒体播放会话管理
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Media: 媒体地址校验与类型识别
//! - Access: 来源/Referer 访问策略
//! - Share: 分享令牌与分享链接
//! - Playback: 播放状态与控制规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（MediaFetcher, ResourceStore, RenderingSurface）
//! - Session: 会话生命周期管理器
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Adapters: HTTP 媒体拉取
//! - Memory: 内存资源仓库
//! - Surface: 浏览器渲染端适配
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
