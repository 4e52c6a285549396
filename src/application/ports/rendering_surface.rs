//! Rendering Surface Port - 渲染端抽象
//!
//! 渲染端（显示画面、接收用户输入）由外部提供；核心只下发命令。
//! 渲染端通过 `time_update` / `pause_detected` 回报事件（见 SessionLifecycleManager）。

use thiserror::Error;

use super::ResourceRef;
use crate::application::session::SessionPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Surface unavailable: {0}")]
    Unavailable(String),
}

/// Rendering Surface Port
pub trait RenderingSurfacePort: Send + Sync {
    /// 挂载资源引用
    fn attach(&self, reference: &ResourceRef, mime_type: &str) -> Result<(), SurfaceError>;

    /// 清除渲染端对资源的直接引用
    fn detach(&self);

    fn play(&self);

    fn pause(&self);

    fn seek(&self, position_secs: f64);

    fn set_volume(&self, volume: f64, muted: bool);

    fn set_fullscreen(&self, fullscreen: bool);

    fn set_controls_visible(&self, visible: bool);

    /// 生命周期阶段变化
    fn phase_changed(&self, phase: SessionPhase);

    /// 展示或清除提示（None 表示清除）
    fn show_notice(&self, message: Option<&str>);

    /// 当前挂载的引用
    fn attached(&self) -> Option<ResourceRef>;
}
