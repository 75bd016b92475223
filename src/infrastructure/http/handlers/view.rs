//! View Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CloseViewCommand, GetView, RetryPollCommand, ViewId, ViewSnapshot};
use crate::infrastructure::http::dto::{ApiResponse, CloseViewDto, SessionStartedDto, ViewRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub(crate) fn parse_view_id(raw: &str) -> Result<ViewId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid view id: {}", raw)))
}

pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(view_id): Path<String>,
) -> Result<Json<ApiResponse<ViewSnapshot>>, ApiError> {
    let view_id = parse_view_id(&view_id)?;
    let snapshot = state.get_view_handler.handle(GetView { view_id }).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn retry_view(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ViewRequest>,
) -> Result<Json<ApiResponse<SessionStartedDto>>, ApiError> {
    let result = state
        .retry_poll_handler
        .handle(RetryPollCommand {
            view_id: req.view_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(result.into())))
}

pub async fn close_view(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ViewRequest>,
) -> Result<Json<ApiResponse<CloseViewDto>>, ApiError> {
    let result = state
        .close_view_handler
        .handle(CloseViewCommand {
            view_id: req.view_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(CloseViewDto {
        view_id: result.view_id,
    })))
}
