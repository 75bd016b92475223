//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 测评后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 结果轮询配置
    #[serde(default)]
    pub polling: PollingConfig,

    /// 报告视图配置
    #[serde(default)]
    pub views: ViewsConfig,

    /// 开发模式配置
    #[serde(default)]
    pub dev: DevConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
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
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 测评后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 后端 API 基础 URL
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 前端凭证（`X-Frontend-Key`），未使用离线后端时必填
    #[serde(default)]
    pub frontend_key: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            frontend_key: String::new(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// 结果轮询配置
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// 单次会话最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 429 且无 Retry-After 时的等待（秒）
    #[serde(default = "default_rate_limit_fallback")]
    pub rate_limit_fallback_secs: u64,

    /// Retry-After 上限（秒）
    #[serde(default = "default_rate_limit_max_wait")]
    pub rate_limit_max_wait_secs: u64,
}

fn default_max_attempts() -> u32 {
    20
}

fn default_rate_limit_fallback() -> u64 {
    30
}

fn default_rate_limit_max_wait() -> u64 {
    300
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            rate_limit_fallback_secs: default_rate_limit_fallback(),
            rate_limit_max_wait_secs: default_rate_limit_max_wait(),
        }
    }
}

impl PollingConfig {
    pub fn rate_limit_fallback(&self) -> Duration {
        Duration::from_secs(self.rate_limit_fallback_secs)
    }

    pub fn rate_limit_max_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_max_wait_secs)
    }
}

/// 报告视图配置
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
    /// 视图空闲超时（秒）
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// 清理扫描间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    3600 // 1 小时
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// 开发模式配置
///
/// 只有 `enabled = true` 时占位标识和离线后端才会生效
#[derive(Debug, Clone, Deserialize)]
pub struct DevConfig {
    #[serde(default)]
    pub enabled: bool,

    /// 提交响应缺少标识时使用的占位标识
    #[serde(default = "default_placeholder_result_id")]
    pub placeholder_result_id: String,

    /// 使用离线假后端，不访问网络
    #[serde(default)]
    pub fake_backend: bool,

    /// 离线后端在第几次查询后返回完成
    #[serde(default = "default_fake_ready_after")]
    pub fake_ready_after: u32,
}

fn default_placeholder_result_id() -> String {
    "dev-placeholder-survey".to_string()
}

fn default_fake_ready_after() -> u32 {
    3
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            placeholder_result_id: default_placeholder_result_id(),
            fake_backend: false,
            fake_ready_after: default_fake_ready_after(),
        }
    }
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
