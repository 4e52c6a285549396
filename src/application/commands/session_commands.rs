//! Session Commands - 会话相关命令

use crate::application::session::SessionSnapshot;
use crate::domain::access::RequestContext;

/// 加载媒体命令 - 替换当前会话
#[derive(Debug, Clone)]
pub struct LoadMediaCommand {
    pub url: String,
    pub context: RequestContext,
}

/// 从分享链接恢复命令
#[derive(Debug, Clone)]
pub struct RestoreSessionCommand {
    pub url: String,
    pub context: RequestContext,
}

/// 恢复响应
#[derive(Debug, Clone)]
pub struct RestoreSessionResponse {
    /// 链接不含分享参数时为 false
    pub restored: bool,
    pub snapshot: SessionSnapshot,
}

/// 播放控制命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    TogglePlay,
    ToggleMute,
    ToggleFullscreen,
    Interact,
    Seek { position_secs: f64 },
    SetVolume { volume: f64 },
    /// 渲染端上报进度
    TimeUpdate { position_secs: f64, duration_secs: f64 },
    /// 渲染端上报暂停
    PauseDetected,
}

impl PlaybackCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TogglePlay => "toggle_play",
            Self::ToggleMute => "toggle_mute",
            Self::ToggleFullscreen => "toggle_fullscreen",
            Self::Interact => "interact",
            Self::Seek { .. } => "seek",
            Self::SetVolume { .. } => "set_volume",
            Self::TimeUpdate { .. } => "time_update",
            Self::PauseDetected => "pause_detected",
        }
    }
}

/// 释放会话命令
#[derive(Debug, Clone, Copy)]
pub struct ReleaseSessionCommand;

/// 释放会话响应
#[derive(Debug, Clone, Copy)]
pub struct ReleaseSessionResponse {
    pub released: bool,
}
