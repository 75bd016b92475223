//! Catalog Handlers - 后端目录、状态与历史透传

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::application::{
    BackendStatusResponse, GetAnalysisHistory, GetAnalysisSummary, GetBackendStatus, GetSurveyModel,
};
use crate::domain::assessment::Instrument;
use crate::infrastructure::http::dto::{ApiResponse, HistoryQuery, SurveyModelQuery};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn survey_model(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SurveyModelQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let instrument = Instrument::from_model_code(&query.code)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown model code: {}", query.code)))?;
    let model = state
        .get_survey_model_handler
        .handle(GetSurveyModel { instrument })
        .await?;
    Ok(Json(ApiResponse::success(model)))
}

pub async fn backend_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BackendStatusResponse>>, ApiError> {
    let status = state
        .get_backend_status_handler
        .handle(GetBackendStatus)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn analysis_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let history = state
        .get_analysis_history_handler
        .handle(GetAnalysisHistory {
            user_id,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(ApiResponse::success(history)))
}

pub async fn analysis_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let summary = state
        .get_analysis_summary_handler
        .handle(GetAnalysisSummary { user_id })
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}
