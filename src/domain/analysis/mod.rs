//! Analysis Context - AI 分析结果限界上下文
//!
//! 职责:
//! - 结果标识（提交接口返回，轮询时使用）
//! - 分析报告（由分析后端生成，对本系统不透明）
//! - `{success, data: {status, analysis}}` 响应信封的解析

mod envelope;
mod errors;
mod report;
mod value_objects;

pub use envelope::{ResultEnvelope, STATUS_COMPLETED, STATUS_NOT_FOUND, STATUS_PENDING};
pub use errors::AnalysisError;
pub use report::AnalysisResult;
pub use value_objects::ResultId;
