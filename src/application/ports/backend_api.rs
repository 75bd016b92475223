//! Backend API Port - 测评后端抽象
//!
//! 定义与测评后端交互的抽象接口，具体实现在 infrastructure/adapters 层。
//! 这一层只负责"发一次请求并归一化结果"，不包含任何重试逻辑。

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::analysis::ResultId;
use crate::domain::assessment::{AssessmentSubmission, Instrument};

/// 后端调用错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// HTTP 429
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// 其他非 2xx 状态码
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 无法连接到后端（DNS、连接被拒绝等）
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    /// 2xx 但响应体不是 JSON
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// 请求无法构造（例如 base URL 非法）
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// 服务器不可达，与其他失败区分开，便于上层决定是否继续重试
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BackendError::Unreachable(_) | BackendError::Timeout)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::RateLimited { .. } => Some(429),
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Backend API Port
///
/// 测评后端的抽象接口。所有请求都带有前端凭证头，凭证缺失属于启动期配置错误。
#[async_trait]
pub trait BackendApiPort: Send + Sync {
    /// `POST /answer/submit`，返回原始响应 JSON
    async fn submit_answers(&self, submission: &AssessmentSubmission) -> Result<Value, BackendError>;

    /// `GET /analysis-result/user/{resultId}`，返回原始响应 JSON
    async fn fetch_analysis_result(&self, result_id: &ResultId) -> Result<Value, BackendError>;

    /// `GET /survey/model?code={modelCode}`
    async fn fetch_survey_model(&self, instrument: Instrument) -> Result<Value, BackendError>;

    /// `GET /analysis-result/user/{userId}/history`
    async fn fetch_analysis_history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError>;

    /// `GET /analysis-result/user/{userId}/summary`
    async fn fetch_analysis_summary(&self, user_id: &str) -> Result<Value, BackendError>;

    /// `GET /ai/status`
    async fn ai_status(&self) -> Result<Value, BackendError>;

    /// `GET /health`
    async fn health_check(&self) -> bool {
        true
    }
}
