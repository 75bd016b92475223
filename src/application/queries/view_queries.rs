//! View Queries

use crate::application::presentation::ViewId;

/// 获取视图快照查询
#[derive(Debug, Clone)]
pub struct GetView {
    pub view_id: ViewId,
}
