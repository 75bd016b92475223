//! Fake Backend Client - 用于测试和离线开发的后端
//!
//! 不发任何网络请求。结果查询先消费脚本队列，队列为空后按
//! `ready_after` 规则为每个结果标识生成响应。

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{BackendApiPort, BackendError};
use crate::domain::analysis::ResultId;
use crate::domain::assessment::{AssessmentSubmission, Instrument};

type FetchHook = Arc<dyn Fn(u32) + Send + Sync>;
type Scripted = Result<Value, BackendError>;

/// Fake Backend Client 配置
#[derive(Debug, Clone, Default)]
pub struct FakeBackendClientConfig {
    /// 同一结果标识在前 N 次查询返回 `not_found`，之后返回 `completed`；
    /// `None` 表示永远不就绪
    pub ready_after: Option<u32>,
    /// 模拟请求延迟
    pub latency: Duration,
}

/// Fake Backend Client
pub struct FakeBackendClient {
    config: FakeBackendClientConfig,
    script: Mutex<VecDeque<Scripted>>,
    per_result_calls: DashMap<String, u32>,
    fetch_calls: AtomicU32,
    submit_calls: AtomicU32,
    submit_response: Mutex<Option<Scripted>>,
    fetch_hook: Option<FetchHook>,
    healthy: AtomicBool,
}

impl FakeBackendClient {
    /// 永远返回 `not_found`
    pub fn new() -> Self {
        Self::with_config(FakeBackendClientConfig::default())
    }

    pub fn with_config(config: FakeBackendClientConfig) -> Self {
        Self {
            config,
            script: Mutex::new(VecDeque::new()),
            per_result_calls: DashMap::new(),
            fetch_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
            submit_response: Mutex::new(None),
            fetch_hook: None,
            healthy: AtomicBool::new(true),
        }
    }

    /// 每个结果标识第 `n + 1` 次查询时完成
    pub fn ready_after(n: u32) -> Self {
        Self::with_config(FakeBackendClientConfig {
            ready_after: Some(n),
            ..Default::default()
        })
    }

    /// 按顺序返回的结果查询响应
    pub fn with_script(self, responses: impl IntoIterator<Item = Scripted>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(responses);
        self
    }

    /// 每次结果查询时以调用序号（从 1 开始）回调
    pub fn with_fetch_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.fetch_hook = Some(Arc::new(hook));
        self
    }

    /// 固定的提交响应（默认生成 `data.surveyId`）
    pub fn with_submit_response(self, response: Scripted) -> Self {
        *self.submit_response.lock().unwrap_or_else(|e| e.into_inner()) = Some(response);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn pending_body() -> Value {
        json!({"success": true, "data": {"status": "not_found"}})
    }

    pub fn completed_body() -> Value {
        json!({
            "success": true,
            "data": {
                "status": "completed",
                "analysis": {
                    "summary": "离线分析报告",
                    "confidenceScore": 0.9,
                    "recommendations": ["保持好奇心"]
                }
            }
        })
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

impl Default for FakeBackendClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendApiPort for FakeBackendClient {
    async fn submit_answers(&self, submission: &AssessmentSubmission) -> Result<Value, BackendError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(call, answers = submission.answer_count(), "FakeBackendClient: submit");
        self.simulate_latency().await;

        let configured = self
            .submit_response
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match configured {
            Some(response) => response,
            None => Ok(json!({
                "success": true,
                "data": {"surveyId": format!("fake-{}", uuid::Uuid::new_v4())}
            })),
        }
    }

    async fn fetch_analysis_result(&self, result_id: &ResultId) -> Result<Value, BackendError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = &self.fetch_hook {
            hook(call);
        }
        self.simulate_latency().await;

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(response) = scripted {
            return response;
        }

        let seen = {
            let mut entry = self
                .per_result_calls
                .entry(result_id.as_str().to_string())
                .or_insert(0);
            *entry += 1;
            *entry
        };

        tracing::debug!(result_id = %result_id, call, seen, "FakeBackendClient: fetch result");

        match self.config.ready_after {
            Some(n) if seen > n => Ok(Self::completed_body()),
            _ => Ok(Self::pending_body()),
        }
    }

    async fn fetch_survey_model(&self, instrument: Instrument) -> Result<Value, BackendError> {
        Ok(json!({
            "success": true,
            "data": {"code": instrument.model_code(), "questions": []}
        }))
    }

    async fn fetch_analysis_history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, BackendError> {
        Ok(json!({
            "success": true,
            "data": {"userId": user_id, "limit": limit, "offset": offset, "items": []}
        }))
    }

    async fn fetch_analysis_summary(&self, user_id: &str) -> Result<Value, BackendError> {
        Ok(json!({
            "success": true,
            "data": {"userId": user_id, "total": 0}
        }))
    }

    async fn ai_status(&self) -> Result<Value, BackendError> {
        Ok(json!({"success": true, "data": {"status": "offline-fake"}}))
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_after_is_per_result() {
        let backend = FakeBackendClient::ready_after(1);
        let a = ResultId::new("a").unwrap();
        let b = ResultId::new("b").unwrap();

        assert_eq!(backend.fetch_analysis_result(&a).await.unwrap(), FakeBackendClient::pending_body());
        assert_eq!(backend.fetch_analysis_result(&b).await.unwrap(), FakeBackendClient::pending_body());
        assert_eq!(backend.fetch_analysis_result(&a).await.unwrap(), FakeBackendClient::completed_body());
        assert_eq!(backend.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn test_script_takes_precedence() {
        let backend = FakeBackendClient::ready_after(0).with_script(vec![Err(BackendError::Timeout)]);
        let id = ResultId::new("a").unwrap();

        assert_eq!(backend.fetch_analysis_result(&id).await, Err(BackendError::Timeout));
        assert_eq!(backend.fetch_analysis_result(&id).await.unwrap(), FakeBackendClient::completed_body());
    }

    #[tokio::test]
    async fn test_default_submit_response_has_identifier() {
        let backend = FakeBackendClient::new();
        let response = backend.submit_answers(&AssessmentSubmission::default()).await.unwrap();
        assert!(response["data"]["surveyId"].as_str().unwrap().starts_with("fake-"));
        assert_eq!(backend.submit_calls(), 1);
    }
}
