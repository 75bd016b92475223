//! Backend Query Handlers

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::application::error::ApplicationError;
use crate::application::ports::BackendApiPort;
use crate::application::queries::{GetAnalysisHistory, GetAnalysisSummary, GetBackendStatus, GetSurveyModel};

// ============================================================================
// Response DTOs
// ============================================================================

/// 后端状态响应
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatusResponse {
    pub healthy: bool,
    /// AI 状态查询失败时为 `None`
    pub ai_status: Option<Value>,
    pub ai_status_error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 用户标识必须非空
fn require_user_id(user_id: &str) -> Result<&str, ApplicationError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ApplicationError::validation("user_id cannot be empty"));
    }
    Ok(trimmed)
}

/// GetSurveyModel Handler
pub struct GetSurveyModelHandler {
    backend: Arc<dyn BackendApiPort>,
}

impl GetSurveyModelHandler {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, query: GetSurveyModel) -> Result<Value, ApplicationError> {
        Ok(self.backend.fetch_survey_model(query.instrument).await?)
    }
}

/// GetBackendStatus Handler
pub struct GetBackendStatusHandler {
    backend: Arc<dyn BackendApiPort>,
}

impl GetBackendStatusHandler {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, _query: GetBackendStatus) -> Result<BackendStatusResponse, ApplicationError> {
        let healthy = self.backend.health_check().await;
        let (ai_status, ai_status_error) = match self.backend.ai_status().await {
            Ok(status) => (Some(status), None),
            Err(e) => {
                tracing::warn!(error = %e, "AI status check failed");
                (None, Some(e.to_string()))
            }
        };

        Ok(BackendStatusResponse {
            healthy,
            ai_status,
            ai_status_error,
        })
    }
}

/// GetAnalysisHistory Handler
pub struct GetAnalysisHistoryHandler {
    backend: Arc<dyn BackendApiPort>,
}

impl GetAnalysisHistoryHandler {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, query: GetAnalysisHistory) -> Result<Value, ApplicationError> {
        let user_id = require_user_id(&query.user_id)?;
        if query.limit == 0 {
            return Err(ApplicationError::validation("limit must be greater than 0"));
        }
        Ok(self
            .backend
            .fetch_analysis_history(user_id, query.limit, query.offset)
            .await?)
    }
}

/// GetAnalysisSummary Handler
pub struct GetAnalysisSummaryHandler {
    backend: Arc<dyn BackendApiPort>,
}

impl GetAnalysisSummaryHandler {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self { backend }
    }

    pub async fn handle(&self, query: GetAnalysisSummary) -> Result<Value, ApplicationError> {
        let user_id = require_user_id(&query.user_id)?;
        Ok(self.backend.fetch_analysis_summary(user_id).await?)
    }
}
