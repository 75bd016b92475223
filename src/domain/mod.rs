//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Assessment Context: 问卷答案（七个测评工具）
//! - Analysis Context: AI 分析结果及其响应信封

pub mod analysis;
pub mod assessment;
