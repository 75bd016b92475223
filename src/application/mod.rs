//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（BackendApi、ViewRegistry、ViewEventSink）
//! - polling: 结果轮询状态机
//! - submission: 答卷提交与结果标识提取
//! - presentation: 报告视图（进度、终态、过期会话抑制）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod polling;
pub mod ports;
pub mod presentation;
pub mod queries;
pub mod submission;

// Re-exports
pub use commands::{
    CloseViewCommand,
    CloseViewResponse,
    RetryPollCommand,
    SessionStartedResponse,
    SubmitAssessmentCommand,
    WatchResultCommand,
    // Handlers
    handlers::{CloseViewHandler, RetryPollHandler, SubmitAssessmentHandler, WatchResultHandler},
};

pub use error::ApplicationError;

pub use polling::{
    AttemptOutcome, PollError, PollOptions, PollRequest, PollStats, PollSuccess, PollerConfig,
    ResultPoller,
};

pub use ports::{BackendApiPort, BackendError, ViewError, ViewEventSink, ViewRegistryPort};

pub use presentation::{ReportView, ReportViewFactory, SessionHandle, ViewId, ViewSnapshot, ViewState};

pub use queries::{
    GetAnalysisHistory,
    GetAnalysisSummary,
    GetBackendStatus,
    GetSurveyModel,
    GetView,
    // Handlers
    handlers::{
        BackendStatusResponse, GetAnalysisHistoryHandler, GetAnalysisSummaryHandler,
        GetBackendStatusHandler, GetSurveyModelHandler, GetViewHandler,
    },
};

pub use submission::{extract_result_id, SubmissionClient, SubmissionError};
