//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::session::SessionManagerConfig;
use crate::domain::access::AccessPolicy;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 远程拉取配置
    #[serde(default)]
    pub fetch: FetchConfig,

    /// 访问门控配置
    #[serde(default)]
    pub access: AccessConfig,

    /// 播放器计时配置
    #[serde(default)]
    pub player: PlayerConfig,

    /// 分享链接配置
    #[serde(default)]
    pub share: ShareConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 分享链接的基础地址：未配置时使用服务器公开地址
    pub fn share_base_url(&self) -> String {
        self.share
            .base_url
            .clone()
            .unwrap_or_else(|| self.server.public_base_url())
    }

    /// 生命周期管理器配置（单次加载上限与拉取超时一致）
    pub fn session_manager_config(&self) -> SessionManagerConfig {
        SessionManagerConfig {
            controls_hide_delay: Duration::from_millis(self.player.controls_hide_ms),
            detach_delay: Duration::from_millis(self.player.detach_delay_ms),
            notice_display: Duration::from_millis(self.player.notice_display_ms),
            load_timeout: Duration::from_secs(self.fetch.timeout_secs),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 远程拉取配置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// 响应体上限（字节）
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_bytes() -> u64 {
    512 * 1024 * 1024 // 512 MiB
}

fn default_user_agent() -> String {
    format!("shieldplay/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_bytes: default_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

/// 访问门控配置
///
/// 两项检查默认关闭（放行）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub enable_domain_check: bool,

    #[serde(default)]
    pub enable_referrer_check: bool,

    #[serde(default)]
    pub allowed_domains: Vec<String>,

    #[serde(default)]
    pub allowed_referrers: Vec<String>,
}

impl AccessConfig {
    /// 转为初始访问策略
    pub fn to_policy(&self) -> AccessPolicy {
        AccessPolicy {
            enable_domain_check: self.enable_domain_check,
            enable_referrer_check: self.enable_referrer_check,
            allowed_domains: self.allowed_domains.iter().cloned().collect(),
            allowed_referrers: self.allowed_referrers.iter().cloned().collect(),
        }
        .normalized()
    }
}

/// 播放器计时配置（毫秒）
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// 播放中控制栏自动隐藏
    #[serde(default = "default_controls_hide")]
    pub controls_hide_ms: u64,

    /// 暂停后解除渲染端引用
    #[serde(default = "default_detach_delay")]
    pub detach_delay_ms: u64,

    /// 提示展示时长
    #[serde(default = "default_notice_display")]
    pub notice_display_ms: u64,
}

fn default_controls_hide() -> u64 {
    3000
}

fn default_detach_delay() -> u64 {
    1000
}

fn default_notice_display() -> u64 {
    5000
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            controls_hide_ms: default_controls_hide(),
            detach_delay_ms: default_detach_delay(),
            notice_display_ms: default_notice_display(),
        }
    }
}

/// 分享链接配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareConfig {
    /// 分享链接指向的页面；未设置时使用服务器公开地址
    #[serde(default)]
    pub base_url: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.player.detach_delay_ms, 1000);
        assert!(!config.access.enable_domain_check);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
        assert_eq!(config.public_base_url(), "http://localhost:5070");
    }

    #[test]
    fn test_share_base_url_falls_back_to_server() {
        let mut config = AppConfig::default();
        assert_eq!(config.share_base_url(), "http://localhost:5070");

        config.share.base_url = Some("https://watch.example.com/".to_string());
        assert_eq!(config.share_base_url(), "https://watch.example.com/");
    }

    #[test]
    fn test_access_config_normalizes_lists() {
        let access = AccessConfig {
            enable_domain_check: true,
            enable_referrer_check: false,
            allowed_domains: vec![" Example.COM ".to_string(), "".to_string()],
            allowed_referrers: vec!["https://ref.example.com/".to_string()],
        };
        let policy = access.to_policy();
        assert!(policy.allowed_domains.contains("example.com"));
        assert_eq!(policy.allowed_domains.len(), 1);
        assert_eq!(policy.allowed_referrers.len(), 1);
    }

    #[test]
    fn test_session_manager_config_from_player() {
        let config = AppConfig::default();
        let manager = config.session_manager_config();
        assert_eq!(manager.controls_hide_delay, Duration::from_millis(3000));
        assert_eq!(manager.load_timeout, Duration::from_secs(30));
    }
}
