//! Share Context - 分享令牌与分享链接
//!
//! 职责:
//! - 媒体地址 <-> 不透明令牌片段的可逆编码
//! - 会话令牌（唯一 + 可解码回媒体地址）
//! - 外部分享链接的组装与解析

mod codec;
mod errors;
mod link;
mod token;

pub use codec::{decode, encode};
pub use errors::{ShareLinkError, TokenError};
pub use link::{parse_incoming, IncomingShare, ShareLink, ShareLinkBuilder, MEDIA_PARAM, TOKEN_PARAM};
pub use token::ShareToken;
