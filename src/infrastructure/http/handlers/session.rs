//! Session Handlers

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::application::{
    GetSessionState, GetShareLink, LoadMediaCommand, PlaybackCommand, ReleaseSessionCommand,
    RestoreSessionCommand, SessionSnapshot,
};
use crate::domain::access::RequestContext;
use crate::infrastructure::http::dto::{
    ApiResponse, ReleaseResponseDto, RestoreResponseDto, SeekRequest, ShareLinkDto,
    TimeUpdateRequest, UrlRequest, VolumeRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

type SnapshotResult = Result<Json<ApiResponse<SessionSnapshot>>, ApiError>;

/// 由请求头推导执行上下文：Origin（缺省用 Host）与 Referer
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "null")
            .map(str::to_string)
    };
    RequestContext::new(header("origin").or_else(|| header("host")), header("referer"))
}

// ============================================================================
// Load / Restore
// ============================================================================

pub async fn load(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UrlRequest>,
) -> SnapshotResult {
    let cmd = LoadMediaCommand {
        url: req.url,
        context: request_context(&headers),
    };

    let snapshot = state.load_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn restore(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UrlRequest>,
) -> Result<Json<ApiResponse<RestoreResponseDto>>, ApiError> {
    let cmd = RestoreSessionCommand {
        url: req.url,
        context: request_context(&headers),
    };

    let result = state.restore_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(RestoreResponseDto {
        restored: result.restored,
        state: result.snapshot,
    })))
}

// ============================================================================
// Playback Controls
// ============================================================================

fn control(state: &AppState, cmd: PlaybackCommand) -> SnapshotResult {
    let snapshot = state.playback_handler.handle(cmd)?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn toggle_play(State(state): State<Arc<AppState>>) -> SnapshotResult {
    control(&state, PlaybackCommand::TogglePlay)
}

pub async fn toggle_mute(State(state): State<Arc<AppState>>) -> SnapshotResult {
    control(&state, PlaybackCommand::ToggleMute)
}

pub async fn toggle_fullscreen(State(state): State<Arc<AppState>>) -> SnapshotResult {
    control(&state, PlaybackCommand::ToggleFullscreen)
}

pub async fn interact(State(state): State<Arc<AppState>>) -> SnapshotResult {
    control(&state, PlaybackCommand::Interact)
}

pub async fn seek(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> SnapshotResult {
    control(
        &state,
        PlaybackCommand::Seek {
            position_secs: req.position,
        },
    )
}

pub async fn set_volume(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VolumeRequest>,
) -> SnapshotResult {
    control(&state, PlaybackCommand::SetVolume { volume: req.volume })
}

// ============================================================================
// Surface Events
// ============================================================================

pub async fn time_update(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TimeUpdateRequest>,
) -> SnapshotResult {
    control(
        &state,
        PlaybackCommand::TimeUpdate {
            position_secs: req.position,
            duration_secs: req.duration,
        },
    )
}

pub async fn pause_detected(State(state): State<Arc<AppState>>) -> SnapshotResult {
    control(&state, PlaybackCommand::PauseDetected)
}

// ============================================================================
// Release / Queries
// ============================================================================

pub async fn release(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<ReleaseResponseDto>> {
    let result = state.release_handler.handle(ReleaseSessionCommand);
    Json(ApiResponse::success(ReleaseResponseDto {
        released: result.released,
    }))
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<ApiResponse<SessionSnapshot>> {
    Json(ApiResponse::success(state.get_state_handler.handle(GetSessionState)))
}

pub async fn get_share_link(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ShareLinkDto>>, ApiError> {
    let link = state.get_share_link_handler.handle(GetShareLink)?;
    Ok(Json(ApiResponse::success(ShareLinkDto::from(link))))
}
