//! Access Context - 访问门控
//!
//! 在任何拉取之前，依据可配置的策略检查执行来源（域名）与 Referer。
//! 关闭的检查一律放行（fail-open），这是显式的配置选择。

mod policy;

pub use policy::{evaluate, AccessDecision, AccessPolicy, DenyReason, RequestContext};
