//! Access Policy Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetPolicy, UpdatePolicyCommand};
use crate::domain::access::AccessPolicy;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn get_policy(State(state): State<Arc<AppState>>) -> Json<ApiResponse<AccessPolicy>> {
    Json(ApiResponse::success(state.get_policy_handler.handle(GetPolicy)))
}

pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    Json(policy): Json<AccessPolicy>,
) -> Result<Json<ApiResponse<AccessPolicy>>, ApiError> {
    let policy = state
        .update_policy_handler
        .handle(UpdatePolicyCommand { policy })?;
    Ok(Json(ApiResponse::success(policy)))
}
