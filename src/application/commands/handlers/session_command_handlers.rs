//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::session::{LoadRequest, SessionLifecycleManager, SessionSnapshot};

/// LoadMedia Handler - 加载远程媒体
pub struct LoadMediaHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl LoadMediaHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(&self, cmd: LoadMediaCommand) -> Result<SessionSnapshot, ApplicationError> {
        let request = LoadRequest::new(cmd.url, cmd.context);
        let snapshot = self.manager.load(request).await?;

        tracing::info!(
            session_id = ?snapshot.session_id,
            display_name = ?snapshot.display_name,
            "Media loaded"
        );
        Ok(snapshot)
    }
}

/// RestoreSession Handler - 从分享链接恢复
pub struct RestoreSessionHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl RestoreSessionHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(
        &self,
        cmd: RestoreSessionCommand,
    ) -> Result<RestoreSessionResponse, ApplicationError> {
        match self.manager.restore(&cmd.url, cmd.context).await? {
            Some(snapshot) => Ok(RestoreSessionResponse {
                restored: true,
                snapshot,
            }),
            None => Ok(RestoreSessionResponse {
                restored: false,
                snapshot: self.manager.snapshot(),
            }),
        }
    }
}

/// Playback Handler - 播放控制与渲染端事件
pub struct PlaybackHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl PlaybackHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, cmd: PlaybackCommand) -> Result<SessionSnapshot, ApplicationError> {
        let result = match cmd {
            PlaybackCommand::TogglePlay => self.manager.toggle_play(),
            PlaybackCommand::ToggleMute => self.manager.toggle_mute(),
            PlaybackCommand::ToggleFullscreen => self.manager.toggle_fullscreen(),
            PlaybackCommand::Interact => self.manager.interact(),
            PlaybackCommand::Seek { position_secs } => self.manager.seek(position_secs),
            PlaybackCommand::SetVolume { volume } => self.manager.set_volume(volume),
            PlaybackCommand::TimeUpdate {
                position_secs,
                duration_secs,
            } => self.manager.time_update(position_secs, duration_secs),
            PlaybackCommand::PauseDetected => self.manager.pause_detected(),
        };

        result.map_err(|e| {
            tracing::debug!(command = cmd.name(), error = %e, "Playback command rejected");
            ApplicationError::from(e)
        })
    }
}

/// ReleaseSession Handler
pub struct ReleaseSessionHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl ReleaseSessionHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, _cmd: ReleaseSessionCommand) -> ReleaseSessionResponse {
        let released = self.manager.release();
        tracing::info!(released = released, "Release requested");
        ReleaseSessionResponse { released }
    }
}
