//! Media Context - 媒体定位上下文
//!
//! 职责:
//! - 远程媒体地址的合法性预检（扩展名 + 协议/托管服务形态）
//! - 展示名称推导

mod errors;
mod value_objects;

pub use errors::MediaError;
pub use value_objects::{DisplayName, MediaExtension, MediaLocator, HOSTING_SHAPES};
