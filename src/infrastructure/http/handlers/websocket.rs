//! WebSocket Handler - 渲染端事件流

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::application::RenderingSurfacePort;
use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 事件 WebSocket 连接处理
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 先订阅再补发当前挂载，避免两者之间的事件丢失
    let mut event_rx = state.event_publisher.subscribe();
    let snapshot = state.manager.snapshot();
    tracing::info!(phase = snapshot.phase.as_str(), "Event WebSocket connected");

    let mut initial = vec![WsEvent::PhaseChanged {
        phase: snapshot.phase,
    }];
    if let Some(reference) = state.surface.attached() {
        if let Ok(resource) = state.resource_store.read(&reference) {
            initial.push(WsEvent::Attach {
                url: state.surface.media_url(&reference),
                reference: reference.to_string(),
                mime_type: resource.mime_type,
            });
        }
    }

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        for event in &initial {
            if let Some(msg) = encode(event) {
                if sender.send(msg).await.is_err() {
                    return;
                }
            }
        }

        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Event WebSocket lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(msg) = encode(&event) else {
                continue;
            };
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Event WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Event WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Event WebSocket disconnected");
}
