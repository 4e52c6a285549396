//! Session Lifecycle - 受保护播放会话
//!
//! 职责:
//! - 单一活动会话的状态机（加载、挂载/分离、释放）
//! - 播放控制与渲染端事件
//! - 分享令牌的生成与恢复

mod errors;
mod manager;
mod model;

pub use errors::SessionError;
pub use manager::SessionLifecycleManager;
pub use model::{
    LoadRequest, Notice, Session, SessionManagerConfig, SessionPhase, SessionSnapshot,
};
