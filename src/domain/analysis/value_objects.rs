//! Analysis Context - Value Objects

use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// 分析结果标识
///
/// 由提交接口返回的不透明字符串，原样保存，一次轮询会话内不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResultId(String);

impl ResultId {
    pub fn new(id: impl Into<String>) -> Result<Self, AnalysisError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AnalysisError::EmptyResultId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResultId {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResultId> for String {
    fn from(id: ResultId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
