//! NeuroSnap - 心理测评前端服务
//!
//! - Domain: assessment/, analysis/
//! - Application: submission, polling, presentation, commands, queries, ports
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use neurosnap::application::{BackendApiPort, PollerConfig};
use neurosnap::config::{load_config, print_config, AppConfig};
use neurosnap::domain::analysis::ResultId;
use neurosnap::infrastructure::adapters::{
    FakeBackendClient, FakeBackendClientConfig, HttpBackendClient, HttpBackendClientConfig,
};
use neurosnap::infrastructure::events::EventPublisher;
use neurosnap::infrastructure::http::{AppState, HttpServer, PollingSettings, ServerConfig};
use neurosnap::infrastructure::memory::InMemoryViewRegistry;
use neurosnap::infrastructure::worker::{ViewSweeper, ViewSweeperConfig};
use tokio_util::sync::CancellationToken;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},neurosnap={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn BackendApiPort>> {
    if config.dev.fake_backend {
        tracing::warn!("Using offline fake backend, no requests leave this process");
        let fake = FakeBackendClient::with_config(FakeBackendClientConfig {
            ready_after: Some(config.dev.fake_ready_after),
            latency: Duration::from_millis(200),
        });
        return Ok(Arc::new(fake));
    }

    let backend_config =
        HttpBackendClientConfig::new(&config.backend.url, &config.backend.frontend_key)
            .with_timeout(config.backend.timeout_secs);
    let client = HttpBackendClient::new(backend_config)
        .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("NeuroSnap - 心理测评前端服务");
    print_config(&config);

    let backend = build_backend(&config)?;

    if !backend.health_check().await {
        tracing::warn!(url = %config.backend.url, "Backend health check failed, continuing anyway");
    }

    let views = Arc::new(InMemoryViewRegistry::new());
    let event_publisher = Arc::new(EventPublisher::new());

    let dev_placeholder = if config.dev.enabled {
        Some(ResultId::new(config.dev.placeholder_result_id.as_str())?)
    } else {
        None
    };
    let settings = PollingSettings {
        max_attempts: config.polling.max_attempts,
        poller: PollerConfig {
            rate_limit_fallback: config.polling.rate_limit_fallback(),
            rate_limit_max_wait: config.polling.rate_limit_max_wait(),
        },
        dev_placeholder,
    };

    // 空闲视图清理
    let shutdown = CancellationToken::new();
    let sweeper = ViewSweeper::new(
        ViewSweeperConfig {
            idle_timeout_secs: config.views.idle_timeout_secs,
            sweep_interval: Duration::from_secs(config.views.sweep_interval_secs),
        },
        views.clone(),
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.clone()));

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(backend, views, event_publisher, settings);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    let server_shutdown = shutdown.clone();
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper_task.await {
        tracing::warn!(error = %e, "View sweeper task ended abnormally");
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}
