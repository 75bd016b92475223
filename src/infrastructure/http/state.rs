//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CloseViewHandler, RetryPollHandler, SubmitAssessmentHandler, WatchResultHandler,
    // Query handlers
    GetAnalysisHistoryHandler, GetAnalysisSummaryHandler, GetBackendStatusHandler,
    GetSurveyModelHandler, GetViewHandler,
    // Ports
    BackendApiPort, ViewRegistryPort,
    // Services
    PollerConfig, ReportViewFactory, ResultPoller, SubmissionClient,
};
use crate::domain::analysis::ResultId;
use crate::infrastructure::events::EventPublisher;

/// 轮询相关设置
#[derive(Debug, Clone)]
pub struct PollingSettings {
    pub max_attempts: u32,
    pub poller: PollerConfig,
    /// 仅开发模式：提交响应缺少标识时的占位标识
    pub dev_placeholder: Option<ResultId>,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            max_attempts: crate::application::polling::DEFAULT_MAX_ATTEMPTS,
            poller: PollerConfig::default(),
            dev_placeholder: None,
        }
    }
}

/// 应用状态
///
/// 报告视图全部为内存实现
pub struct AppState {
    // ========== Ports ==========
    pub backend: Arc<dyn BackendApiPort>,
    pub views: Arc<dyn ViewRegistryPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub submit_assessment_handler: SubmitAssessmentHandler,
    pub watch_result_handler: WatchResultHandler,
    pub retry_poll_handler: RetryPollHandler,
    pub close_view_handler: CloseViewHandler,

    // ========== Query Handlers ==========
    pub get_view_handler: GetViewHandler,
    pub get_survey_model_handler: GetSurveyModelHandler,
    pub get_backend_status_handler: GetBackendStatusHandler,
    pub get_analysis_history_handler: GetAnalysisHistoryHandler,
    pub get_analysis_summary_handler: GetAnalysisSummaryHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        views: Arc<dyn ViewRegistryPort>,
        event_publisher: Arc<EventPublisher>,
        settings: PollingSettings,
    ) -> Self {
        let poller = Arc::new(ResultPoller::new(backend.clone(), settings.poller));
        let factory = Arc::new(ReportViewFactory::new(
            poller,
            settings.max_attempts,
            event_publisher.clone(),
        ));

        let mut submission_client = SubmissionClient::new(backend.clone());
        if let Some(placeholder) = settings.dev_placeholder {
            submission_client = submission_client.with_dev_fallback(placeholder);
        }
        let submission_client = Arc::new(submission_client);

        Self {
            // Ports
            backend: backend.clone(),
            views: views.clone(),
            event_publisher: event_publisher.clone(),

            // Command handlers
            submit_assessment_handler: SubmitAssessmentHandler::new(
                submission_client,
                factory.clone(),
                views.clone(),
            ),
            watch_result_handler: WatchResultHandler::new(factory.clone(), views.clone()),
            retry_poll_handler: RetryPollHandler::new(factory.clone(), views.clone()),
            close_view_handler: CloseViewHandler::new(views.clone()),

            // Query handlers
            get_view_handler: GetViewHandler::new(views.clone()),
            get_survey_model_handler: GetSurveyModelHandler::new(backend.clone()),
            get_backend_status_handler: GetBackendStatusHandler::new(backend.clone()),
            get_analysis_history_handler: GetAnalysisHistoryHandler::new(backend.clone()),
            get_analysis_summary_handler: GetAnalysisSummaryHandler::new(backend),
        }
    }
}
