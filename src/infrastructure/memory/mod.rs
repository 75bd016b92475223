//! Memory Layer - In-Memory State Management
//!
//! 实现 ViewRegistry，管理报告视图的内存状态

mod view_registry;

pub use view_registry::InMemoryViewRegistry;
