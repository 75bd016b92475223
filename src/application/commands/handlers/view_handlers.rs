//! View Command Handlers

use std::sync::Arc;

use crate::application::commands::{CloseViewCommand, CloseViewResponse, RetryPollCommand, SessionStartedResponse};
use crate::application::error::ApplicationError;
use crate::application::ports::ViewRegistryPort;
use crate::application::presentation::ReportViewFactory;

/// RetryPoll Handler - 新会话，从第 1 次尝试开始
pub struct RetryPollHandler {
    factory: Arc<ReportViewFactory>,
    views: Arc<dyn ViewRegistryPort>,
}

impl RetryPollHandler {
    pub fn new(factory: Arc<ReportViewFactory>, views: Arc<dyn ViewRegistryPort>) -> Self {
        Self { factory, views }
    }

    pub async fn handle(&self, cmd: RetryPollCommand) -> Result<SessionStartedResponse, ApplicationError> {
        let view = self.views.get(&cmd.view_id)?;
        let handle = self.factory.retry(&view)?;
        let result_id = view
            .last_result_id()
            .ok_or_else(|| ApplicationError::invalid_state("view has no result id"))?;

        tracing::info!(
            view_id = %cmd.view_id,
            result_id = %result_id,
            generation = handle.generation,
            "Poll session retried"
        );

        Ok(SessionStartedResponse {
            view_id: cmd.view_id,
            result_id,
            generation: handle.generation,
            max_attempts: self.factory.max_attempts(),
        })
    }
}

/// CloseView Handler - 取消轮询并移除视图
pub struct CloseViewHandler {
    views: Arc<dyn ViewRegistryPort>,
}

impl CloseViewHandler {
    pub fn new(views: Arc<dyn ViewRegistryPort>) -> Self {
        Self { views }
    }

    pub async fn handle(&self, cmd: CloseViewCommand) -> Result<CloseViewResponse, ApplicationError> {
        let view = self
            .views
            .remove(&cmd.view_id)
            .ok_or_else(|| ApplicationError::not_found("View", cmd.view_id))?;
        view.teardown();

        tracing::info!(view_id = %cmd.view_id, "View closed");

        Ok(CloseViewResponse { view_id: cmd.view_id })
    }
}
