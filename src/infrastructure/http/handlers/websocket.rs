//! WebSocket Handler - 报告视图状态推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::application::ViewId;
use crate::infrastructure::events::ViewEvent;
use crate::infrastructure::http::state::AppState;

/// View WebSocket 连接处理（进度与终态通知）
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(view_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_view_socket(socket, view_id, state))
}

fn encode(event: &ViewEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

async fn handle_view_socket(socket: WebSocket, raw_view_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 验证视图存在
    let view = match raw_view_id
        .parse::<ViewId>()
        .ok()
        .and_then(|id| state.views.get(&id).ok())
    {
        Some(view) => view,
        None => {
            tracing::warn!(view_id = %raw_view_id, "WebSocket connection rejected: unknown view");
            let _ = sender.close().await;
            return;
        }
    };
    let view_id = view.id();

    // 先注册再取快照，避免漏掉两者之间的事件
    let mut event_rx = state.event_publisher.register_view(&view_id);
    let snapshot = view.snapshot();

    tracing::info!(view_id = %view_id, generation = snapshot.generation, "WebSocket connected");

    let initial = ViewEvent::StateChanged {
        view_id,
        generation: snapshot.generation,
        state: snapshot.state,
    };
    if let Some(msg) = encode(&initial) {
        if sender.send(msg).await.is_err() {
            return;
        }
    }

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(view_id = %view_id, skipped, "WebSocket receiver lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let closing = matches!(event, ViewEvent::ViewClosed { .. });
            if let Some(msg) = encode(&event) {
                if let Err(e) = sender.send(msg).await {
                    tracing::debug!(view_id = %view_id, error = %e, "Failed to send WebSocket message");
                    break;
                }
            }
            if closing {
                let _ = sender.close().await;
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(view_id = %view_id, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(view_id = %view_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {
                    // 任何客户端消息都视为活跃
                    view.touch();
                }
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(view_id = %view_id, "WebSocket disconnected");
}
