//! View Registry Port - 报告视图生命周期管理
//!
//! 定义视图存取的抽象接口，具体实现在 infrastructure/memory 层

use std::sync::Arc;

use thiserror::Error;

use crate::application::presentation::{ReportView, ViewId};

/// View Registry 错误
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("View not found: {0}")]
    NotFound(ViewId),

    #[error("View already exists: {0}")]
    AlreadyExists(ViewId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// View Registry Port
///
/// 所有视图只存在于内存中，进程重启即丢失
pub trait ViewRegistryPort: Send + Sync {
    /// 注册新视图
    fn insert(&self, view: Arc<ReportView>) -> Result<(), ViewError>;

    /// 获取视图
    fn get(&self, id: &ViewId) -> Result<Arc<ReportView>, ViewError>;

    /// 移除视图（不负责取消轮询，由调用方 teardown）
    fn remove(&self, id: &ViewId) -> Option<Arc<ReportView>>;

    /// 获取所有空闲超时视图的 ID
    fn get_expired_views(&self, idle_timeout_secs: u64) -> Vec<ViewId>;

    /// 获取所有视图 ID
    fn list_all(&self) -> Vec<ViewId>;
}
