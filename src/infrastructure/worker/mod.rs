//! Worker Layer - Background Task Processing
//!
//! 实现 ViewSweeper，定期清理空闲的报告视图

mod view_sweeper;

pub use view_sweeper::{ViewSweeper, ViewSweeperConfig};
