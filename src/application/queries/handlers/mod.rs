//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod backend_handlers;
mod view_handlers;

pub use backend_handlers::*;
pub use view_handlers::*;
