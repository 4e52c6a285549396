//! Media Context - Value Objects

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::MediaError;

/// 识别的传输协议
const TRANSPORT_SCHEMES: &[&str] = &["http://", "https://"];

/// 已知托管服务的地址形态（可省略协议，补全为 https）
pub const HOSTING_SHAPES: &[&str] = &[
    "drive.google.com/",
    "dropbox.com/",
    "www.dropbox.com/",
    "onedrive.live.com/",
    "1drv.ms/",
    "archive.org/",
];

/// 支持的媒体扩展名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaExtension {
    Mp4,
    Mp3,
    Webm,
    Avi,
    Mov,
    Mkv,
    Flv,
    Wmv,
    M4v,
    Wav,
    Ogg,
    Flac,
    M4a,
}

impl MediaExtension {
    pub const ALL: [MediaExtension; 13] = [
        Self::Mp4,
        Self::Mp3,
        Self::Webm,
        Self::Avi,
        Self::Mov,
        Self::Mkv,
        Self::Flv,
        Self::Wmv,
        Self::M4v,
        Self::Wav,
        Self::Ogg,
        Self::Flac,
        Self::M4a,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "mp3" => Some(Self::Mp3),
            "webm" => Some(Self::Webm),
            "avi" => Some(Self::Avi),
            "mov" => Some(Self::Mov),
            "mkv" => Some(Self::Mkv),
            "flv" => Some(Self::Flv),
            "wmv" => Some(Self::Wmv),
            "m4v" => Some(Self::M4v),
            "wav" => Some(Self::Wav),
            "ogg" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mp3 => "mp3",
            Self::Webm => "webm",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Mkv => "mkv",
            Self::Flv => "flv",
            Self::Wmv => "wmv",
            Self::M4v => "m4v",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::M4a => "m4a",
        }
    }

    /// 渲染端使用的 Content-Type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 | Self::M4v => "video/mp4",
            Self::Mp3 => "audio/mpeg",
            Self::Webm => "video/webm",
            Self::Avi => "video/x-msvideo",
            Self::Mov => "video/quicktime",
            Self::Mkv => "video/x-matroska",
            Self::Flv => "video/x-flv",
            Self::Wmv => "video/x-ms-wmv",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::M4a => "audio/mp4",
        }
    }
}

/// 媒体地址 - 经过预检的远程媒体 URL
///
/// 不变量:
/// - 路径以受支持的扩展名结尾（忽略大小写、query 与 fragment）
/// - 以 http/https 开头，或匹配已知托管服务形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocator {
    raw: String,
    url: Url,
    extension: MediaExtension,
}

impl MediaLocator {
    /// 预检并构造媒体地址，不发起任何网络请求
    pub fn parse(input: &str) -> Result<Self, MediaError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MediaError::EmptyLocator);
        }

        let lower = input.to_ascii_lowercase();
        let raw = if TRANSPORT_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            input.to_string()
        } else if HOSTING_SHAPES.iter().any(|s| lower.starts_with(s)) {
            format!("https://{}", input)
        } else {
            return Err(MediaError::UnrecognizedSource(input.to_string()));
        };

        let url = Url::parse(&raw).map_err(|e| MediaError::MalformedLocator(e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(MediaError::MalformedLocator(format!("missing host: {}", input)));
        }

        let file_name = last_segment(&url).unwrap_or_default();
        let extension = file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| MediaExtension::from_extension(ext))
            .ok_or_else(|| MediaError::UnsupportedExtension(file_name.clone()))?;

        Ok(Self {
            raw,
            url,
            extension,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn extension(&self) -> MediaExtension {
        self.extension
    }

    pub fn display_name(&self) -> DisplayName {
        match last_segment(&self.url) {
            Some(name) => {
                // 百分号编码还原成可读文字；非 UTF-8 时保留原样
                let decoded = urlencoding::decode(&name).map(|d| d.into_owned()).ok();
                DisplayName(decoded.unwrap_or(name))
            }
            None => DisplayName(format!("media.{}", self.extension.extension())),
        }
    }
}

impl std::fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
}

/// 展示名称（仅供 UI，非权威）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
