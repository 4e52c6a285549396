//! Ping Handler
//!
//! 健康检查，附带当前会话阶段

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::SessionPhase;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub phase: SessionPhase,
}

pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        phase: state.manager.phase(),
    })
}
