//! Token Codec - 媒体地址的可逆编码
//!
//! URL-safe base64（无填充），对任意 UTF-8 字符串都是全函数。

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::TokenError;

/// 编码媒体地址
pub fn encode(locator: &str) -> String {
    URL_SAFE_NO_PAD.encode(locator.as_bytes())
}

/// 解码令牌片段
pub fn decode(token: &str) -> Result<String, TokenError> {
    if token.is_empty() {
        return Err(TokenError::MalformedToken("empty token".to_string()));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| TokenError::MalformedToken(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TokenError::MalformedToken(e.to_string()))
}
