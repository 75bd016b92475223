//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：视图快照与后端目录/历史透传

mod backend_queries;
mod view_queries;

pub mod handlers;

pub use backend_queries::*;
pub use view_queries::*;
