//! HTTP Layer - RESTful API + WebSocket
//!
//! 控制接口、媒体字节与渲染端事件流

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
