//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SHIELDPLAY_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SHIELDPLAY_SERVER__PORT=8080`
/// - `SHIELDPLAY_FETCH__TIMEOUT_SECS=60`
/// - `SHIELDPLAY_ACCESS__ENABLE_DOMAIN_CHECK=true`
/// - `SHIELDPLAY_ACCESS__ALLOWED_DOMAINS=a.com,b.com`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("fetch.timeout_secs", 30)?
        .set_default("fetch.max_bytes", 512_u64 * 1024 * 1024)?
        .set_default("access.enable_domain_check", false)?
        .set_default("access.enable_referrer_check", false)?
        .set_default("player.controls_hide_ms", 3000)?
        .set_default("player.detach_delay_ms", 1000)?
        .set_default("player.notice_display_ms", 5000)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），列表用逗号分隔
    builder = builder.add_source(
        Environment::with_prefix("SHIELDPLAY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("access.allowed_domains")
            .with_list_parse_key("access.allowed_referrers"),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Fetch timeout cannot be 0".to_string(),
        ));
    }

    if config.fetch.max_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Fetch max_bytes cannot be 0".to_string(),
        ));
    }

    if config.player.controls_hide_ms == 0 || config.player.notice_display_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Player timeouts cannot be 0".to_string(),
        ));
    }

    if config.player.detach_delay_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Detach delay cannot be 0".to_string(),
        ));
    }

    let share_base = config.share_base_url();
    if reqwest::Url::parse(&share_base).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "Invalid share base URL: {}",
            share_base
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Share Base URL: {}", config.share_base_url());
    tracing::info!("Fetch Timeout: {}s", config.fetch.timeout_secs);
    tracing::info!("Fetch Max Bytes: {}", config.fetch.max_bytes);
    tracing::info!(
        "Domain Check: {} ({} allowed)",
        config.access.enable_domain_check,
        config.access.allowed_domains.len()
    );
    tracing::info!(
        "Referrer Check: {} ({} allowed)",
        config.access.enable_referrer_check,
        config.access.allowed_referrers.len()
    );
    tracing::info!(
        "Player: controls_hide={}ms detach_delay={}ms notice={}ms",
        config.player.controls_hide_ms,
        config.player.detach_delay_ms,
        config.player.notice_display_ms
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
