//! 单次请求结果分类

use serde_json::Value;

use crate::application::ports::BackendError;
use crate::domain::analysis::{AnalysisResult, ResultEnvelope};

/// 结果尚未就绪的原因
#[derive(Debug, Clone, PartialEq)]
pub enum NotReadyReason {
    /// 后端明确返回 `not_found` / `pending`
    Pending(String),
    /// 无法识别的响应形状，同样继续轮询，但单独记录
    Unrecognized(String),
}

/// 一次 "获取结果" 请求的分类结果
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// 唯一的成功出口；`payload` 为 `None` 表示报告字段缺失或为空
    Completed { payload: Option<AnalysisResult> },
    NotReady { reason: NotReadyReason },
    RateLimited { retry_after_secs: Option<u64> },
    TransientError { message: String },
    /// 请求本身无法构造，重试没有意义
    FatalError { message: String },
}

impl AttemptOutcome {
    pub fn from_response(response: Result<Value, BackendError>) -> Self {
        match response {
            Ok(body) => Self::from_body(&body),
            Err(BackendError::RateLimited { retry_after_secs }) => {
                AttemptOutcome::RateLimited { retry_after_secs }
            }
            Err(BackendError::InvalidRequest(message)) => AttemptOutcome::FatalError { message },
            Err(err) => AttemptOutcome::TransientError {
                message: err.to_string(),
            },
        }
    }

    pub fn from_body(body: &Value) -> Self {
        match ResultEnvelope::parse(body) {
            ResultEnvelope::Completed { analysis } => AttemptOutcome::Completed { payload: analysis },
            ResultEnvelope::Pending { status } => AttemptOutcome::NotReady {
                reason: NotReadyReason::Pending(status),
            },
            ResultEnvelope::Unrecognized { reason } => AttemptOutcome::NotReady {
                reason: NotReadyReason::Unrecognized(reason),
            },
        }
    }
}
