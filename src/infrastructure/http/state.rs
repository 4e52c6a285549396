//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    LoadMediaHandler, PlaybackHandler, ReleaseSessionHandler, RestoreSessionHandler,
    UpdatePolicyHandler,
    // Query handlers
    GetPolicyHandler, GetSessionStateHandler, GetShareLinkHandler,
    // Ports
    ResourceStorePort, SessionLifecycleManager,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::surface::BrowserSurface;

/// 应用状态
pub struct AppState {
    // ========== Core ==========
    pub manager: Arc<SessionLifecycleManager>,
    pub resource_store: Arc<dyn ResourceStorePort>,
    pub surface: Arc<BrowserSurface>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub load_handler: LoadMediaHandler,
    pub restore_handler: RestoreSessionHandler,
    pub playback_handler: PlaybackHandler,
    pub release_handler: ReleaseSessionHandler,
    pub update_policy_handler: UpdatePolicyHandler,

    // ========== Query Handlers ==========
    pub get_state_handler: GetSessionStateHandler,
    pub get_share_link_handler: GetShareLinkHandler,
    pub get_policy_handler: GetPolicyHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        manager: Arc<SessionLifecycleManager>,
        resource_store: Arc<dyn ResourceStorePort>,
        surface: Arc<BrowserSurface>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            // Command handlers
            load_handler: LoadMediaHandler::new(manager.clone()),
            restore_handler: RestoreSessionHandler::new(manager.clone()),
            playback_handler: PlaybackHandler::new(manager.clone()),
            release_handler: ReleaseSessionHandler::new(manager.clone()),
            update_policy_handler: UpdatePolicyHandler::new(manager.clone()),

            // Query handlers
            get_state_handler: GetSessionStateHandler::new(manager.clone()),
            get_share_link_handler: GetShareLinkHandler::new(manager.clone()),
            get_policy_handler: GetPolicyHandler::new(manager.clone()),

            // Core
            manager,
            resource_store,
            surface,
            event_publisher,
        }
    }
}
