//! Assessment Context - 测评问卷限界上下文
//!
//! 职责:
//! - 测评工具（五问法、MBTI、大五人格、DISC、霍兰德、价值观）
//! - 完整答卷的提交结构
//!
//! 字段校验与计分由问卷向导负责，这里不做任何校验。

mod instrument;
mod submission;

pub use instrument::Instrument;
pub use submission::{AnswerMap, AssessmentSubmission, UserInfo};
