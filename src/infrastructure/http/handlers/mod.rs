//! HTTP Handlers

mod media;
mod ping;
mod policy;
mod session;
mod websocket;

pub use media::*;
pub use ping::*;
pub use policy::*;
pub use session::*;
pub use websocket::*;
