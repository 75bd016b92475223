//! HTTP Backend Client - 调用测评后端 HTTP 服务
//!
//! 实现 BackendApiPort trait。每个请求都带前端凭证头 `X-Frontend-Key`。
//!
//! 后端 API（相对于 base_url）:
//! POST /answer/submit
//! GET  /analysis-result/user/{resultId}
//! GET  /analysis-result/user/{userId}/history?limit=&offset=
//! GET  /analysis-result/user/{userId}/summary
//! GET  /survey/model?code={modelCode}
//! GET  /ai/status
//! GET  /health

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

use crate::application::ports::{BackendApiPort, BackendError};
use crate::domain::analysis::ResultId;
use crate::domain::assessment::{AssessmentSubmission, Instrument};

pub const FRONTEND_KEY_HEADER: &str = "X-Frontend-Key";

/// 健康检查超时
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP 后端客户端配置
#[derive(Debug, Clone)]
pub struct HttpBackendClientConfig {
    /// 后端 API 基础 URL（含 `/api` 前缀）
    pub base_url: String,
    /// 前端凭证
    pub frontend_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpBackendClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            frontend_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl HttpBackendClientConfig {
    pub fn new(base_url: impl Into<String>, frontend_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            frontend_key: frontend_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 后端客户端
///
/// 只做"一次请求 + 错误归一化"，不重试。
pub struct HttpBackendClient {
    client: Client,
    base_url: Url,
}

impl HttpBackendClient {
    /// 创建客户端；凭证缺失或 URL 非法属于启动期配置错误
    pub fn new(config: HttpBackendClientConfig) -> Result<Self, BackendError> {
        if config.frontend_key.trim().is_empty() {
            return Err(BackendError::InvalidRequest(
                "frontend key is not configured".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidRequest(format!("invalid base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidRequest(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.frontend_key.trim())
            .map_err(|e| BackendError::InvalidRequest(format!("invalid frontend key: {}", e)))?;
        headers.insert(FRONTEND_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("NeuroSnap-Frontend/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        tracing::info!(
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            "HttpBackendClient initialized"
        );

        Ok(Self { client, base_url })
    }

    /// 拼接 URL，每个片段作为独立的路径段（会被百分号编码）
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidRequest(format!("base url '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 发送请求并把响应归一化为 JSON 或 BackendError
    async fn send(&self, request: RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(response.headers());
            tracing::debug!(retry_after_secs = ?retry_after_secs, "Backend responded 429");
            return Err(BackendError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!(status = status.as_u16(), message = %message, "Backend request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidBody(e.to_string()))
    }

    async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, BackendError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "GET backend");
        self.send(self.client.get(url).query(query)).await
    }
}

/// 传输层错误分类：连接失败 / 超时 / 其他
fn classify_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else if e.is_connect() {
        BackendError::Unreachable(format!("server unreachable: {}", e))
    } else if e.is_builder() {
        BackendError::InvalidRequest(e.to_string())
    } else {
        BackendError::Network(e.to_string())
    }
}

/// 只支持秒数形式的 Retry-After
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// 错误信息优先取 JSON 的 `message` / `error` 字段，否则用状态码原因短语
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown Status").to_string())
}

#[async_trait]
impl BackendApiPort for HttpBackendClient {
    async fn submit_answers(&self, submission: &AssessmentSubmission) -> Result<Value, BackendError> {
        let url = self.endpoint(&["answer", "submit"])?;
        tracing::debug!(url = %url, answers = submission.answer_count(), "POST answers");
        self.send(self.client.post(url).json(submission)).await
    }

    async fn fetch_analysis_result(&self, result_id: &ResultId) -> Result<Value, BackendError> {
        self.get(&["analysis-result", "user", result_id.as_str()], &[])
            .await
    }

    async fn fetch_survey_model(&self, instrument: Instrument) -> Result<Value, BackendError> {
        self.get(
            &["survey", "model"],
            &[("code", instrument.model_code().to_string())],
        )
        .await
    }

    async fn fetch_analysis_history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError> {
        self.get(
            &["analysis-result", "user", user_id, "history"],
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn fetch_analysis_summary(&self, user_id: &str) -> Result<Value, BackendError> {
        self.get(&["analysis-result", "user", user_id, "summary"], &[])
            .await
    }

    async fn ai_status(&self) -> Result<Value, BackendError> {
        self.get(&["ai", "status"], &[]).await
    }

    async fn health_check(&self) -> bool {
        let Ok(url) = self.endpoint(&["health"]) else {
            return false;
        };
        match self.client.get(url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Backend health check failed");
                false
            }
        }
    }
}
