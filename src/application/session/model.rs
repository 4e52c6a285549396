//! Session Model - 会话、阶段与快照

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::ResourceHandle;
use crate::domain::access::RequestContext;
use crate::domain::media::{DisplayName, MediaLocator};
use crate::domain::playback::PlaybackState;
use crate::domain::share::ShareToken;

/// 生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Loading,
    Active,
    Detached,
    Released,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Detached => "detached",
            Self::Released => "released",
        }
    }
}

/// 受保护的播放会话
///
/// 不变量:
/// - 恰好持有一个资源句柄，由 SessionLifecycleManager 独占
/// - `locator` 永远不会交给渲染端
pub struct Session {
    pub(crate) id: String,
    pub(crate) locator: MediaLocator,
    pub(crate) display_name: DisplayName,
    pub(crate) handle: ResourceHandle,
    pub(crate) token: ShareToken,
    pub(crate) playback: PlaybackState,
    pub(crate) attached: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(locator: MediaLocator, handle: ResourceHandle, token: ShareToken) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: locator.display_name(),
            locator,
            handle,
            token,
            playback: PlaybackState::new(),
            attached: true,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_locator(&self) -> &MediaLocator {
        &self.locator
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn share_token(&self) -> &ShareToken {
        &self.token
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> SessionPhase {
        if self.attached {
            SessionPhase::Active
        } else {
            SessionPhase::Detached
        }
    }
}

/// 用户可见的提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// 提供给渲染端的只读视图（不含来源地址）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub resource_reference: Option<String>,
    pub display_name: Option<String>,
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub controls_visible: bool,
    pub notice: Option<Notice>,
}

impl SessionSnapshot {
    pub(crate) fn empty(phase: SessionPhase, notice: Option<Notice>) -> Self {
        let playback = PlaybackState::default();
        Self {
            phase,
            session_id: None,
            resource_reference: None,
            display_name: None,
            is_playing: playback.is_playing,
            position_secs: playback.position_secs,
            duration_secs: playback.duration_secs,
            volume: playback.volume,
            is_muted: playback.is_muted,
            is_fullscreen: playback.is_fullscreen,
            controls_visible: playback.controls_visible,
            notice,
        }
    }

    pub(crate) fn of(session: &Session, notice: Option<Notice>) -> Self {
        let playback = &session.playback;
        let resource_reference = if session.attached {
            session.handle.reference().ok().map(|r| r.to_string())
        } else {
            None
        };
        Self {
            phase: session.phase(),
            session_id: Some(session.id.clone()),
            resource_reference,
            display_name: Some(session.display_name.to_string()),
            is_playing: playback.is_playing,
            position_secs: playback.position_secs,
            duration_secs: playback.duration_secs,
            volume: playback.volume,
            is_muted: playback.is_muted,
            is_fullscreen: playback.is_fullscreen,
            controls_visible: playback.controls_visible,
            notice,
        }
    }
}

/// 加载请求
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub locator: String,
    /// 从分享链接恢复时携带的既有令牌
    pub token: Option<ShareToken>,
    pub context: RequestContext,
}

impl LoadRequest {
    pub fn new(locator: impl Into<String>, context: RequestContext) -> Self {
        Self {
            locator: locator.into(),
            token: None,
            context,
        }
    }

    pub fn with_token(mut self, token: ShareToken) -> Self {
        self.token = Some(token);
        self
    }
}

/// 生命周期管理器配置
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// 播放中控制栏自动隐藏的静默时长
    pub controls_hide_delay: Duration,
    /// 暂停后解除渲染端引用的延迟
    pub detach_delay: Duration,
    /// 提示信息展示时长
    pub notice_display: Duration,
    /// 单次加载的上限时长
    pub load_timeout: Duration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            controls_hide_delay: Duration::from_millis(3000),
            detach_delay: Duration::from_millis(1000),
            notice_display: Duration::from_millis(5000),
            load_timeout: Duration::from_secs(30),
        }
    }
}
