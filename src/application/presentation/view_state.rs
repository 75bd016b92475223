//! 视图状态

use serde::{Deserialize, Serialize};

use crate::application::polling::{PollError, PollSuccess};
use crate::domain::analysis::AnalysisResult;

pub const MSG_TIMED_OUT: &str = "分析仍在进行中，请稍后再来查看结果";
pub const MSG_FAILED: &str = "获取分析结果失败，请稍后重试";
pub const MSG_EMPTY: &str = "暂无分析结果";
pub const MSG_SUBMISSION_FAILED: &str = "提交未能确认，请重新提交问卷";

/// 报告视图状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Polling {
        current_attempt: u32,
        max_attempts: u32,
    },
    Report {
        analysis: AnalysisResult,
    },
    /// 后端声明完成但没有报告，属于契约不一致而非瞬时故障
    Empty {
        message: String,
    },
    /// 尝试次数耗尽，提示稍后再看
    TimedOut {
        message: String,
        attempts: u32,
    },
    Failed {
        message: String,
    },
    /// 提交未拿到结果标识，提示重新提交
    SubmissionFailed {
        message: String,
    },
}

impl ViewState {
    pub fn polling(current_attempt: u32, max_attempts: u32) -> Self {
        ViewState::Polling {
            current_attempt,
            max_attempts,
        }
    }

    pub fn from_success(success: PollSuccess) -> Self {
        match success.analysis {
            Some(analysis) => ViewState::Report { analysis },
            None => ViewState::Empty {
                message: MSG_EMPTY.to_string(),
            },
        }
    }

    /// 取消不产生任何视图状态
    pub fn from_poll_error(err: &PollError) -> Option<Self> {
        match err {
            PollError::Cancelled { .. } => None,
            PollError::ExhaustedAttempts { attempts, .. } => Some(ViewState::TimedOut {
                message: MSG_TIMED_OUT.to_string(),
                attempts: *attempts,
            }),
            PollError::Transient { .. } | PollError::Fatal { .. } | PollError::InvalidOptions(_) => {
                Some(ViewState::Failed {
                    message: MSG_FAILED.to_string(),
                })
            }
        }
    }

    pub fn submission_failed() -> Self {
        ViewState::SubmissionFailed {
            message: MSG_SUBMISSION_FAILED.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewState::Idle | ViewState::Polling { .. })
    }

    /// 超时与失败可以通过重试开启新会话
    pub fn is_retryable(&self) -> bool {
        matches!(self, ViewState::TimedOut { .. } | ViewState::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::polling::PollStats;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_success_mapping() {
        let analysis = AnalysisResult::from_value(json!({"summary": "ok"}));
        let report = ViewState::from_success(PollSuccess {
            analysis,
            stats: PollStats::default(),
        });
        assert!(matches!(report, ViewState::Report { .. }));

        let empty = ViewState::from_success(PollSuccess {
            analysis: None,
            stats: PollStats::default(),
        });
        assert_eq!(
            empty,
            ViewState::Empty {
                message: MSG_EMPTY.to_string()
            }
        );
    }

    #[test]
    fn test_error_mapping() {
        let timed_out = ViewState::from_poll_error(&PollError::ExhaustedAttempts {
            attempts: 20,
            total_wait: Duration::from_secs(250),
        })
        .unwrap();
        assert_eq!(
            timed_out,
            ViewState::TimedOut {
                message: MSG_TIMED_OUT.to_string(),
                attempts: 20
            }
        );

        let failed = ViewState::from_poll_error(&PollError::Transient {
            attempt: 3,
            message: "HTTP 500".to_string(),
        })
        .unwrap();
        assert!(matches!(failed, ViewState::Failed { .. }));
        assert_ne!(MSG_FAILED, MSG_TIMED_OUT);
        assert_ne!(MSG_SUBMISSION_FAILED, MSG_TIMED_OUT);

        assert!(ViewState::from_poll_error(&PollError::Cancelled { attempts: 2 }).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ViewState::polling(3, 20)).unwrap();
        assert_eq!(
            value,
            json!({"state": "polling", "current_attempt": 3, "max_attempts": 20})
        );
        let value = serde_json::to_value(ViewState::submission_failed()).unwrap();
        assert_eq!(value["state"], "submission_failed");
    }

    #[test]
    fn test_state_predicates() {
        assert!(!ViewState::Idle.is_terminal());
        assert!(!ViewState::polling(1, 2).is_terminal());
        assert!(ViewState::submission_failed().is_terminal());
        assert!(!ViewState::submission_failed().is_retryable());
        assert!(ViewState::Failed {
            message: MSG_FAILED.to_string()
        }
        .is_retryable());
    }
}
