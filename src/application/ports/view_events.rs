//! View Event Sink Port - 视图状态推送
//!
//! 具体实现在 infrastructure/events 层（WebSocket 广播）

use crate::application::presentation::{ViewId, ViewState};

/// View Event Sink
///
/// 报告视图每次状态变化后调用。实现必须是非阻塞的，
/// 没有订阅者时直接丢弃事件。
pub trait ViewEventSink: Send + Sync {
    /// 视图状态已更新
    fn publish_state(&self, view_id: &ViewId, generation: u64, state: &ViewState);

    /// 视图已关闭
    fn publish_closed(&self, view_id: &ViewId);
}
