//! Analysis Context - 分析报告

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// AI 分析报告
///
/// 报告结构（概要、置信度、各工具的解读、建议列表等）由分析后端决定，
/// 这里只保存原始 JSON，并提供展示层用到的少量字段访问。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// 从 `data.analysis` 构造
    ///
    /// 只有非空 JSON 对象才被视为可展示的报告，其余情况返回 `None`。
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => Some(Self(Value::Object(map))),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(Value::as_str)
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.0.get("confidenceScore").and_then(Value::as_f64)
    }

    pub fn recommendations(&self) -> Vec<&str> {
        self.0
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(AnalysisResult::from_value(json!(null)).is_none());
        assert!(AnalysisResult::from_value(json!({})).is_none());
        assert!(AnalysisResult::from_value(json!("text")).is_none());
        assert!(AnalysisResult::from_value(json!({"summary": "ok"})).is_some());
    }

    #[test]
    fn test_accessors() {
        let report = AnalysisResult::from_value(json!({
            "summary": "外向、重视成长",
            "confidenceScore": 0.82,
            "recommendations": ["产品经理", 3, "咨询顾问"]
        }))
        .unwrap();

        assert_eq!(report.summary(), Some("外向、重视成长"));
        assert_eq!(report.confidence_score(), Some(0.82));
        assert_eq!(report.recommendations(), vec!["产品经理", "咨询顾问"]);
    }
}
