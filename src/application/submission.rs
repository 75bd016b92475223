//! Submission Client - 提交答卷并获取结果标识
//!
//! 后端在不同部署下的响应形状不一致，结果标识按固定顺序查找：
//! `data.surveyId` → `data.userId` → `surveyId` → `userId` → `id`，第一个非空值胜出。

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::application::ports::{BackendApiPort, BackendError};
use crate::domain::analysis::ResultId;
use crate::domain::assessment::AssessmentSubmission;

const RESULT_ID_PATHS: [&[&str]; 5] = [
    &["data", "surveyId"],
    &["data", "userId"],
    &["surveyId"],
    &["userId"],
    &["id"],
];

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 响应中找不到结果标识，不重试（重复提交可能产生重复数据）
    #[error("Submission response carries no result identifier")]
    IdentifierMissing { response: Value },

    #[error("Submission request failed: {0}")]
    Backend(#[from] BackendError),
}

/// 按固定顺序从提交响应中提取结果标识
///
/// 纯空白字符串视为缺失，其余字符串原样保留；数字标识转为字符串。
pub fn extract_result_id(response: &Value) -> Option<ResultId> {
    RESULT_ID_PATHS.iter().find_map(|path| {
        let value = path
            .iter()
            .try_fold(response, |node, key| node.get(*key))?;
        match value {
            Value::String(s) => ResultId::new(s.as_str()).ok(),
            Value::Number(n) => ResultId::new(n.to_string()).ok(),
            _ => None,
        }
    })
}

/// 提交客户端
pub struct SubmissionClient {
    backend: Arc<dyn BackendApiPort>,
    /// 仅开发模式下设置
    dev_placeholder: Option<ResultId>,
}

impl SubmissionClient {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self {
            backend,
            dev_placeholder: None,
        }
    }

    /// 开发模式：响应中缺少标识时使用固定占位标识
    pub fn with_dev_fallback(mut self, placeholder: ResultId) -> Self {
        tracing::warn!(
            placeholder = %placeholder,
            "Development placeholder result id enabled for submissions"
        );
        self.dev_placeholder = Some(placeholder);
        self
    }

    /// 提交答卷（只调用一次后端）
    pub async fn submit(&self, submission: &AssessmentSubmission) -> Result<ResultId, SubmissionError> {
        tracing::info!(
            answers = submission.answer_count(),
            "Submitting assessment answers"
        );

        let response = self.backend.submit_answers(submission).await.map_err(|e| {
            tracing::error!(error = %e, "Assessment submission failed");
            SubmissionError::from(e)
        })?;

        if let Some(result_id) = extract_result_id(&response) {
            tracing::info!(result_id = %result_id, "Assessment submitted");
            return Ok(result_id);
        }

        if let Some(placeholder) = &self.dev_placeholder {
            tracing::warn!(
                placeholder = %placeholder,
                response = %response,
                "No result id in submission response, using development placeholder"
            );
            return Ok(placeholder.clone());
        }

        tracing::error!(response = %response, "No result id in submission response");
        Err(SubmissionError::IdentifierMissing { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::backend::FakeBackendClient;
    use serde_json::json;

    fn id(response: Value) -> Option<String> {
        extract_result_id(&response).map(|id| id.as_str().to_string())
    }

    #[test]
    fn test_extract_fallback_order() {
        assert_eq!(id(json!({"data": {"surveyId": "X"}})), Some("X".to_string()));
        assert_eq!(id(json!({"userId": "Y"})), Some("Y".to_string()));
        assert_eq!(id(json!({})), None);

        assert_eq!(
            id(json!({"data": {"surveyId": "A", "userId": "B"}, "surveyId": "C"})),
            Some("A".to_string())
        );
        assert_eq!(
            id(json!({"data": {"userId": "B"}, "surveyId": "C"})),
            Some("B".to_string())
        );
        assert_eq!(id(json!({"surveyId": "C", "id": "E"})), Some("C".to_string()));
        assert_eq!(id(json!({"id": "E"})), Some("E".to_string()));
    }

    #[test]
    fn test_extract_skips_empty_values() {
        assert_eq!(
            id(json!({"data": {"surveyId": "  ", "userId": null}, "userId": "Y"})),
            Some("Y".to_string())
        );
        assert_eq!(id(json!({"data": "oops", "id": 17})), Some("17".to_string()));
        assert_eq!(id(json!({"id": true})), None);
        assert_eq!(id(json!({"surveyId": " s-7 "})), Some(" s-7 ".to_string()));
        assert_eq!(id(json!([1, 2])), None);
    }

    fn submission() -> AssessmentSubmission {
        AssessmentSubmission::default()
    }

    #[tokio::test]
    async fn test_submit_returns_identifier() {
        let backend = Arc::new(
            FakeBackendClient::new().with_submit_response(Ok(json!({"data": {"surveyId": "s-1"}}))),
        );
        let client = SubmissionClient::new(backend.clone());

        let result_id = client.submit(&submission()).await.unwrap();
        assert_eq!(result_id.as_str(), "s-1");
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_identifier_fails() {
        let backend = Arc::new(FakeBackendClient::new().with_submit_response(Ok(json!({"success": true}))));
        let client = SubmissionClient::new(backend.clone());

        let err = client.submit(&submission()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::IdentifierMissing { .. }));
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn test_dev_placeholder_only_when_missing() {
        let backend = Arc::new(FakeBackendClient::new().with_submit_response(Ok(json!({}))));
        let client = SubmissionClient::new(backend)
            .with_dev_fallback(ResultId::new("dev-placeholder-survey").unwrap());
        assert_eq!(
            client.submit(&submission()).await.unwrap().as_str(),
            "dev-placeholder-survey"
        );

        let backend = Arc::new(FakeBackendClient::new().with_submit_response(Ok(json!({"id": "real"}))));
        let client = SubmissionClient::new(backend)
            .with_dev_fallback(ResultId::new("dev-placeholder-survey").unwrap());
        assert_eq!(client.submit(&submission()).await.unwrap().as_str(), "real");
    }

    #[tokio::test]
    async fn test_backend_error_is_surfaced() {
        let backend = Arc::new(FakeBackendClient::new().with_submit_response(Err(BackendError::Status {
            status: 400,
            message: "invalid payload".to_string(),
        })));
        let client = SubmissionClient::new(backend)
            .with_dev_fallback(ResultId::new("dev-placeholder-survey").unwrap());

        let err = client.submit(&submission()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Backend(BackendError::Status { status: 400, .. })
        ));
    }
}
