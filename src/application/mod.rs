//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（MediaFetcher、ResourceStore、RenderingSurface）
//! - session: 会话生命周期管理器
//! - timer: 可取消定时器
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod session;
pub mod timer;

// Re-exports
pub use commands::{
    // Session commands
    LoadMediaCommand,
    PlaybackCommand,
    ReleaseSessionCommand,
    ReleaseSessionResponse,
    RestoreSessionCommand,
    RestoreSessionResponse,
    // Policy commands
    UpdatePolicyCommand,
    // Handlers
    handlers::{
        LoadMediaHandler, PlaybackHandler, ReleaseSessionHandler, RestoreSessionHandler,
        UpdatePolicyHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Media fetcher
    FetchError,
    FetchedMedia,
    MediaFetcherPort,
    // Rendering surface
    RenderingSurfacePort,
    SurfaceError,
    // Resource store
    ResourceError,
    ResourceHandle,
    ResourceRef,
    ResourceStorePort,
    StoredResource,
};

pub use queries::{
    handlers::{GetPolicyHandler, GetSessionStateHandler, GetShareLinkHandler, ShareLinkResponse},
    GetPolicy, GetSessionState, GetShareLink,
};

pub use session::{
    LoadRequest, Notice, SessionError, SessionLifecycleManager, SessionManagerConfig,
    SessionPhase, SessionSnapshot,
};
