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
/// 1. 环境变量（前缀 `NEUROSNAP_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NEUROSNAP_SERVER__PORT=8080`
/// - `NEUROSNAP_BACKEND__URL=https://api.example.com/api`
/// - `NEUROSNAP_BACKEND__FRONTEND_KEY=...`
/// - `NEUROSNAP_POLLING__MAX_ATTEMPTS=30`
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
        .set_default("backend.url", "http://localhost:8080/api")?
        .set_default("backend.frontend_key", "")?
        .set_default("backend.timeout_secs", 30)?
        .set_default("polling.max_attempts", 20)?
        .set_default("polling.rate_limit_fallback_secs", 30)?
        .set_default("polling.rate_limit_max_wait_secs", 300)?
        .set_default("views.idle_timeout_secs", 3600)?
        .set_default("views.sweep_interval_secs", 300)?
        .set_default("dev.enabled", false)?
        .set_default("dev.placeholder_result_id", "dev-placeholder-survey")?
        .set_default("dev.fake_backend", false)?
        .set_default("dev.fake_ready_after", 3)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: NEUROSNAP_BACKEND__URL=http://backend:8080/api
    builder = builder.add_source(
        Environment::with_prefix("NEUROSNAP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
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

    if config.backend.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend URL cannot be empty".to_string(),
        ));
    }

    // 离线后端不发请求，其余情况必须提供前端凭证
    if config.backend.frontend_key.trim().is_empty() && !config.dev.fake_backend {
        return Err(ConfigError::ValidationError(
            "Backend frontend key is required (set NEUROSNAP_BACKEND__FRONTEND_KEY)".to_string(),
        ));
    }

    if config.polling.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Polling max_attempts must be at least 1".to_string(),
        ));
    }

    if config.dev.fake_backend && !config.dev.enabled {
        return Err(ConfigError::ValidationError(
            "Fake backend requires dev.enabled = true".to_string(),
        ));
    }

    if config.dev.enabled && config.dev.placeholder_result_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Development placeholder result id cannot be empty".to_string(),
        ));
    }

    if config.views.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "View sweep interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Backend URL: {}", config.backend.url);
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!(
        "Frontend Key: {}",
        if config.backend.frontend_key.is_empty() { "<unset>" } else { "<redacted>" }
    );
    tracing::info!("Poll Max Attempts: {}", config.polling.max_attempts);
    tracing::info!(
        "Rate Limit Wait: fallback {}s, max {}s",
        config.polling.rate_limit_fallback_secs,
        config.polling.rate_limit_max_wait_secs
    );
    tracing::info!(
        "View Idle Timeout: {}s (sweep every {}s)",
        config.views.idle_timeout_secs,
        config.views.sweep_interval_secs
    );
    if config.dev.enabled {
        tracing::warn!("Development mode enabled");
        tracing::warn!("Placeholder Result Id: {}", config.dev.placeholder_result_id);
        if config.dev.fake_backend {
            tracing::warn!(
                "Fake backend enabled (ready after {} fetches)",
                config.dev.fake_ready_after
            );
        }
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
