//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：提交答卷、开启/重试/关闭报告视图

mod assessment_commands;
mod view_commands;

pub mod handlers;

pub use assessment_commands::*;
pub use view_commands::*;
