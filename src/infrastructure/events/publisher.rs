//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现：渲染端命令与会话生命周期变化

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::session::SessionPhase;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 挂载资源（浏览器通过 url 读取字节）
    Attach {
        reference: String,
        url: String,
        mime_type: String,
    },
    /// 清除资源引用
    Detach,
    Play,
    Pause,
    Seek {
        position_secs: f64,
    },
    Volume {
        volume: f64,
        muted: bool,
    },
    Fullscreen {
        enabled: bool,
    },
    ControlsVisibility {
        visible: bool,
    },
    /// 会话阶段变化
    PhaseChanged {
        phase: SessionPhase,
    },
    /// 提示信息（None 表示清除）
    Notice {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.channel.subscribe()
    }

    /// 发布事件
    pub fn publish(&self, event: WsEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
