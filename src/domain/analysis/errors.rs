//! Analysis Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("结果标识不能为空")]
    EmptyResultId,
}
