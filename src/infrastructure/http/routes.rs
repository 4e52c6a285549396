//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                       GET   健康检查
//! - /api/session/load               POST  加载远程媒体
//! - /api/session/restore            POST  从分享链接恢复
//! - /api/session/toggle_play        POST  播放/暂停
//! - /api/session/toggle_mute        POST  静音切换
//! - /api/session/toggle_fullscreen  POST  全屏切换
//! - /api/session/interact           POST  用户交互（显示控制栏）
//! - /api/session/seek               POST  定位
//! - /api/session/volume             POST  音量
//! - /api/session/time_update        POST  渲染端进度上报
//! - /api/session/pause_detected     POST  渲染端暂停上报
//! - /api/session/release            POST  释放会话
//! - /api/session/state              GET   会话快照
//! - /api/session/share              GET   分享链接
//! - /api/policy                     GET/POST 访问策略
//! - /media/{reference}              GET   已挂载资源的字节
//! - /ws/events                      WS    渲染端事件流

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/media/:reference", get(handlers::serve_media))
        .route("/ws/events", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/session", session_routes())
        .route(
            "/policy",
            get(handlers::get_policy).post(handlers::update_policy),
        )
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/load", post(handlers::load))
        .route("/restore", post(handlers::restore))
        .route("/toggle_play", post(handlers::toggle_play))
        .route("/toggle_mute", post(handlers::toggle_mute))
        .route("/toggle_fullscreen", post(handlers::toggle_fullscreen))
        .route("/interact", post(handlers::interact))
        .route("/seek", post(handlers::seek))
        .route("/volume", post(handlers::set_volume))
        .route("/time_update", post(handlers::time_update))
        .route("/pause_detected", post(handlers::pause_detected))
        .route("/release", post(handlers::release))
        .route("/state", get(handlers::get_state))
        .route("/share", get(handlers::get_share_link))
}
