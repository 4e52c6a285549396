//! Policy Commands - 访问策略命令

use crate::domain::access::AccessPolicy;

/// 更新访问策略命令
#[derive(Debug, Clone)]
pub struct UpdatePolicyCommand {
    pub policy: AccessPolicy,
}
