//! Shieldplay - 受保护的媒体播放服务
//!
//! 拉取远程媒体到内存，只向渲染端暴露临时引用，并管理播放会话。

use std::sync::Arc;

use shieldplay::application::SessionLifecycleManager;
use shieldplay::config::{load_config, print_config};
use shieldplay::domain::share::ShareLinkBuilder;
use shieldplay::infrastructure::adapters::{HttpMediaFetcher, HttpMediaFetcherConfig};
use shieldplay::infrastructure::events::EventPublisher;
use shieldplay::infrastructure::http::{AppState, HttpServer, ServerConfig};
use shieldplay::infrastructure::memory::InMemoryResourceStore;
use shieldplay::infrastructure::surface::BrowserSurface;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},shieldplay={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!("Shieldplay - 受保护的媒体播放服务");
    print_config(&config);

    let event_publisher = EventPublisher::new().arc();
    let surface = Arc::new(BrowserSurface::new(event_publisher.clone()));
    let resource_store = InMemoryResourceStore::new().arc();

    let fetcher_config = HttpMediaFetcherConfig {
        timeout_secs: config.fetch.timeout_secs,
        max_bytes: config.fetch.max_bytes,
        user_agent: config.fetch.user_agent.clone(),
    };
    let fetcher = Arc::new(HttpMediaFetcher::new(fetcher_config)?);

    let share_builder = ShareLinkBuilder::parse(&config.share_base_url())?;

    let manager = SessionLifecycleManager::new(
        config.session_manager_config(),
        fetcher,
        resource_store.clone(),
        surface.clone(),
        share_builder,
        config.access.to_policy(),
    )
    .arc();

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        manager.clone(),
        resource_store,
        surface.clone(),
        event_publisher,
    );
    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // 释放会话与内存中的媒体，通知渲染端断开
    manager.shutdown();
    surface.close();

    tracing::info!("Server shutdown complete");

    Ok(())
}
