//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod assessment_handlers;
mod view_handlers;

pub use assessment_handlers::*;
pub use view_handlers::*;
