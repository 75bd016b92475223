//! Analysis Context - 结果响应信封
//!
//! `GET /analysis-result/user/{resultId}` 的成功响应形如
//! `{"success": true, "data": {"status": "completed", "analysis": {...}}}`。
//! 后端的状态约定并不完全可靠，任何无法识别的形状都单独归类，
//! 由轮询器决定如何处理。

use serde_json::Value;

use super::AnalysisResult;

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_NOT_FOUND: &str = "not_found";
pub const STATUS_PENDING: &str = "pending";

/// 解析后的结果信封
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    /// `status == "completed"`；`analysis` 缺失或不是对象时为 `None`
    Completed { analysis: Option<AnalysisResult> },
    /// `status == "not_found" | "pending"`
    Pending { status: String },
    /// 其他任何形状
    Unrecognized { reason: String },
}

impl ResultEnvelope {
    pub fn parse(body: &Value) -> Self {
        match body.get("success").and_then(Value::as_bool) {
            Some(true) => {}
            Some(false) => {
                return Self::unrecognized(format!(
                    "success=false: {}",
                    error_hint(body).unwrap_or("no message")
                ))
            }
            None => return Self::unrecognized("missing success flag"),
        }

        let Some(data) = body.get("data").filter(|data| data.is_object()) else {
            return Self::unrecognized("missing data object");
        };

        match data.get("status").and_then(Value::as_str) {
            Some(STATUS_COMPLETED) => ResultEnvelope::Completed {
                analysis: data
                    .get("analysis")
                    .cloned()
                    .and_then(AnalysisResult::from_value),
            },
            Some(status @ (STATUS_NOT_FOUND | STATUS_PENDING)) => ResultEnvelope::Pending {
                status: status.to_string(),
            },
            Some(other) => Self::unrecognized(format!("unexpected status '{}'", other)),
            None => Self::unrecognized("missing data.status"),
        }
    }

    fn unrecognized(reason: impl Into<String>) -> Self {
        ResultEnvelope::Unrecognized {
            reason: reason.into(),
        }
    }
}

fn error_hint(body: &Value) -> Option<&str> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
}
