//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::ViewEventSink;
use crate::application::presentation::{ViewId, ViewState};

/// 每个视图通道的缓冲容量
const CHANNEL_CAPACITY: usize = 100;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ViewEvent {
    /// 视图状态变更
    StateChanged {
        view_id: ViewId,
        generation: u64,
        #[serde(flatten)]
        state: ViewState,
    },
    /// 视图关闭
    ViewClosed { view_id: ViewId, reason: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// view_id -> broadcast sender
    view_channels: DashMap<ViewId, broadcast::Sender<ViewEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            view_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册视图的事件通道（已存在则复用）
    pub fn register_view(&self, view_id: &ViewId) -> broadcast::Receiver<ViewEvent> {
        self.view_channels
            .entry(*view_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 取消注册视图
    pub fn unregister_view(&self, view_id: &ViewId) {
        self.view_channels.remove(view_id);
    }

    /// 获取视图的事件接收器
    pub fn subscribe(&self, view_id: &ViewId) -> Option<broadcast::Receiver<ViewEvent>> {
        self.view_channels.get(view_id).map(|s| s.subscribe())
    }

    /// 当前有通道的视图数量
    pub fn channel_count(&self) -> usize {
        self.view_channels.len()
    }

    /// 发布事件到指定视图
    fn publish_to_view(&self, view_id: &ViewId, event: ViewEvent) {
        if let Some(sender) = self.view_channels.get(view_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    view_id = %view_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEventSink for EventPublisher {
    fn publish_state(&self, view_id: &ViewId, generation: u64, state: &ViewState) {
        self.publish_to_view(
            view_id,
            ViewEvent::StateChanged {
                view_id: *view_id,
                generation,
                state: state.clone(),
            },
        );
    }

    fn publish_closed(&self, view_id: &ViewId) {
        self.publish_to_view(
            view_id,
            ViewEvent::ViewClosed {
                view_id: *view_id,
                reason: "closed".to_string(),
            },
        );
        self.unregister_view(view_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_to_registered_view() {
        let publisher = EventPublisher::new();
        let view_id = ViewId::new();
        let mut rx = publisher.register_view(&view_id);

        publisher.publish_state(&view_id, 1, &ViewState::polling(2, 20));

        match rx.recv().await.unwrap() {
            ViewEvent::StateChanged {
                generation, state, ..
            } => {
                assert_eq!(generation, 1);
                assert_eq!(state, ViewState::polling(2, 20));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_unregisters_channel() {
        let publisher = EventPublisher::new();
        let view_id = ViewId::new();
        let mut rx = publisher.register_view(&view_id);
        let _second = publisher.register_view(&view_id);
        assert_eq!(publisher.channel_count(), 1);

        publisher.publish_closed(&view_id);

        assert!(matches!(rx.recv().await.unwrap(), ViewEvent::ViewClosed { .. }));
        assert!(publisher.subscribe(&view_id).is_none());
        // 没有通道时发布是空操作
        publisher.publish_state(&view_id, 2, &ViewState::Idle);
    }

    #[test]
    fn test_event_wire_format() {
        let view_id = ViewId::new();
        let event = ViewEvent::StateChanged {
            view_id,
            generation: 3,
            state: ViewState::polling(1, 20),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "StateChanged");
        assert_eq!(value["data"]["generation"], 3);
        assert_eq!(value["data"]["state"], "polling");
        assert_eq!(value["data"]["current_attempt"], 1);
        assert_eq!(value["data"]["view_id"], view_id.to_string());
    }
}
