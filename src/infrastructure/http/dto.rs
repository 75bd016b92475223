//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{SessionStartedResponse, ViewId};
use crate::domain::assessment::AssessmentSubmission;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Assessment DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    /// 复用已有视图；为空时创建新视图
    #[serde(default, alias = "viewId")]
    pub view_id: Option<ViewId>,
    pub submission: AssessmentSubmission,
}

#[derive(Debug, Deserialize)]
pub struct WatchResultRequest {
    #[serde(default, alias = "viewId")]
    pub view_id: Option<ViewId>,
    #[serde(alias = "resultId")]
    pub result_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStartedDto {
    pub view_id: ViewId,
    pub result_id: String,
    pub generation: u64,
    pub max_attempts: u32,
}

impl From<SessionStartedResponse> for SessionStartedDto {
    fn from(response: SessionStartedResponse) -> Self {
        Self {
            view_id: response.view_id,
            result_id: response.result_id.to_string(),
            generation: response.generation,
            max_attempts: response.max_attempts,
        }
    }
}

// ============================================================================
// View DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    #[serde(alias = "viewId")]
    pub view_id: ViewId,
}

#[derive(Debug, Serialize)]
pub struct CloseViewDto {
    pub view_id: ViewId,
}

// ============================================================================
// Catalog DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SurveyModelQuery {
    pub code: String,
}

fn default_history_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}
