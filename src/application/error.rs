//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{BackendError, ViewError};
use crate::application::submission::SubmissionError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 提交未拿到结果标识
    #[error("Submission not confirmed: {0}")]
    SubmissionUnconfirmed(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 后端限流
    #[error("Backend rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<BackendError> for ApplicationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            BackendError::InvalidRequest(message) => Self::InternalError(message),
            other => Self::ExternalServiceError(other.to_string()),
        }
    }
}

impl From<ViewError> for ApplicationError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::NotFound(id) => Self::not_found("View", id),
            ViewError::AlreadyExists(id) => Self::invalid_state(format!("view {} already exists", id)),
            ViewError::InvalidOperation(message) => Self::InvalidState(message),
        }
    }
}

impl From<SubmissionError> for ApplicationError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::IdentifierMissing { .. } => Self::SubmissionUnconfirmed(err.to_string()),
            SubmissionError::Backend(backend) => backend.into(),
        }
    }
}
