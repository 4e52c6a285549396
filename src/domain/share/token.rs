//! Share Token - 会话令牌
//!
//! 格式: `<nonce>.<codec>`，nonce 为 32 位十六进制随机串，codec 为媒体地址的编码。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{codec, TokenError};

const NONCE_LEN: usize = 32;

/// 分享令牌
///
/// 不变量:
/// - 每个会话唯一（nonce）
/// - 解码后可还原媒体地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
    /// 为媒体地址生成新令牌
    pub fn generate(locator: &str) -> Self {
        Self(format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            codec::encode(locator)
        ))
    }

    /// 解析外部传入的令牌并做结构校验
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let (nonce, body) = raw
            .split_once('.')
            .ok_or_else(|| TokenError::MalformedToken("missing separator".to_string()))?;
        if nonce.len() != NONCE_LEN || !nonce.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::MalformedToken("invalid nonce".to_string()));
        }
        codec::decode(body)?;
        Ok(Self(raw.to_string()))
    }

    /// 令牌还原出的媒体地址
    pub fn locator(&self) -> Result<String, TokenError> {
        match self.0.split_once('.') {
            Some((_, body)) => codec::decode(body),
            None => Err(TokenError::MalformedToken("missing separator".to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShareToken {
    type Error = TokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShareToken> for String {
    fn from(token: ShareToken) -> Self {
        token.0
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_decodes_to_locator() {
        let token = ShareToken::generate("https://host/video.mp4");
        assert_eq!(token.locator().unwrap(), "https://host/video.mp4");
        assert_eq!(ShareToken::parse(token.as_str()).unwrap(), token);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = ShareToken::generate("https://host/video.mp4");
        let b = ShareToken::generate("https://host/video.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_rejects_bad_structure() {
        assert!(ShareToken::parse("").is_err());
        assert!(ShareToken::parse("abc").is_err());
        assert!(ShareToken::parse("xyz.aGVsbG8").is_err());
        let nonce = "0".repeat(32);
        assert!(ShareToken::parse(&format!("{}.!!!", nonce)).is_err());
        assert!(ShareToken::parse(&format!("{}.aGVsbG8", nonce)).is_ok());
    }
}
