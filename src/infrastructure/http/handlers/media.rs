//! Media Handler - 为渲染端提供已挂载资源的字节

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::ResourceRef;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 只服务当前挂载到渲染端的引用；分离或释放后一律 404
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
) -> Result<Response, ApiError> {
    let reference = ResourceRef::from_string(reference);
    if !state.surface.is_attached(&reference) {
        return Err(ApiError::NotFound(format!("Media not attached: {}", reference)));
    }

    let resource = state
        .resource_store
        .read(&reference)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    tracing::debug!(reference = %reference, size = resource.bytes.len(), "Serving media");

    Ok((
        [
            (header::CONTENT_TYPE, resource.mime_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        resource.bytes,
    )
        .into_response())
}
