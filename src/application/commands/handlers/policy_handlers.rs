//! Policy Command Handlers

use std::sync::Arc;

use crate::application::commands::UpdatePolicyCommand;
use crate::application::error::ApplicationError;
use crate::application::session::SessionLifecycleManager;
use crate::domain::access::AccessPolicy;

/// UpdatePolicy Handler
pub struct UpdatePolicyHandler {
    manager: Arc<SessionLifecycleManager>,
}

impl UpdatePolicyHandler {
    pub fn new(manager: Arc<SessionLifecycleManager>) -> Self {
        Self { manager }
    }

    pub fn handle(&self, cmd: UpdatePolicyCommand) -> Result<AccessPolicy, ApplicationError> {
        let policy = cmd.policy.normalized();
        self.manager.set_policy(policy.clone())?;
        Ok(policy)
    }
}
