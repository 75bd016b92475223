//! Assessment Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{SubmitAssessmentCommand, WatchResultCommand};
use crate::domain::analysis::ResultId;
use crate::infrastructure::http::dto::{
    ApiResponse, SessionStartedDto, SubmitAssessmentRequest, WatchResultRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Submit
// ============================================================================

pub async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<Json<ApiResponse<SessionStartedDto>>, ApiError> {
    let cmd = SubmitAssessmentCommand {
        view_id: req.view_id,
        submission: req.submission,
    };

    let result = state.submit_assessment_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

// ============================================================================
// Watch
// ============================================================================

pub async fn watch_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WatchResultRequest>,
) -> Result<Json<ApiResponse<SessionStartedDto>>, ApiError> {
    let result_id = ResultId::new(req.result_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let cmd = WatchResultCommand {
        view_id: req.view_id,
        result_id,
    };

    let result = state.watch_result_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(result.into())))
}
