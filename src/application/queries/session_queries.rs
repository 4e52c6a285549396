//! Session Queries

/// 获取当前会话快照
#[derive(Debug, Clone, Copy)]
pub struct GetSessionState;

/// 获取当前会话的分享链接
#[derive(Debug, Clone, Copy)]
pub struct GetShareLink;

/// 获取当前访问策略
#[derive(Debug, Clone, Copy)]
pub struct GetPolicy;
