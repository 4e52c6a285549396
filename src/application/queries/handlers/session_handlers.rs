//! Session Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::queries::{GetPolicy, GetSessionState, GetShareLink};
use crate::application::session::{SessionLifecycleManager, SessionSnapshot};
use crate::domain::access::AccessPolicy;
use crate::domain::share::ShareLink;

// ============================================================================
// Response DTOs
// ============================================================================

/// 分享链接响应
#[derive(Debug, Clone)]
pub struct ShareLinkResponse {
    pub token: String,
    pub url: String,
    pub created_at: String,
}

impl From<ShareLink> for ShareLinkResponse {
    fn from(link: ShareLink) -> Self {
        Self {
            token: link.token,
            url: link.composed_url,
            created_at: link.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSessionState Handler
pub struct GetSessionStateHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl GetSessionStateHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, _query: GetSessionState) -> SessionSnapshot {
        self.manager.snapshot()
    }
}

/// GetShareLink Handler
pub struct GetShareLinkHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl GetShareLinkHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, _query: GetShareLink) -> Result<ShareLinkResponse, ApplicationError> {
        let link = self.manager.share_link()?;
        Ok(ShareLinkResponse::from(link))
    }
}

/// GetPolicy Handler
pub struct GetPolicyHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl GetPolicyHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, _query: GetPolicy) -> AccessPolicy {
        self.manager.policy()
    }
}
