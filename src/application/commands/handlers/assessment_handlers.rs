//! Assessment Command Handlers

use std::sync::Arc;

use crate::application::commands::{SessionStartedResponse, SubmitAssessmentCommand, WatchResultCommand};
use crate::application::error::ApplicationError;
use crate::application::ports::ViewRegistryPort;
use crate::application::presentation::{ReportView, ReportViewFactory, ViewId};
use crate::application::submission::SubmissionClient;

/// 取已有视图，或创建并注册新视图
fn resolve_view(
    views: &dyn ViewRegistryPort,
    factory: &ReportViewFactory,
    view_id: Option<ViewId>,
) -> Result<Arc<ReportView>, ApplicationError> {
    match view_id {
        Some(id) => Ok(views.get(&id)?),
        None => {
            let view = factory.create_view();
            views.insert(view.clone())?;
            Ok(view)
        }
    }
}

/// SubmitAssessment Handler - 提交答卷并开启轮询
pub struct SubmitAssessmentHandler {
    submission_client: Arc<SubmissionClient>,
    factory: Arc<ReportViewFactory>,
    views: Arc<dyn ViewRegistryPort>,
}

impl SubmitAssessmentHandler {
    pub fn new(
        submission_client: Arc<SubmissionClient>,
        factory: Arc<ReportViewFactory>,
        views: Arc<dyn ViewRegistryPort>,
    ) -> Self {
        Self {
            submission_client,
            factory,
            views,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitAssessmentCommand,
    ) -> Result<SessionStartedResponse, ApplicationError> {
        // 调用方指定的视图必须先存在；新视图等提交成功后再创建
        let existing = match cmd.view_id {
            Some(id) => Some(self.views.get(&id)?),
            None => None,
        };

        let result_id = match self.submission_client.submit(&cmd.submission).await {
            Ok(result_id) => result_id,
            Err(err) => {
                // 提交失败不重试，调用方持有的视图进入 SubmissionFailed
                if let Some(view) = &existing {
                    if let Err(view_err) = view.mark_submission_failed() {
                        tracing::warn!(view_id = %view.id(), error = %view_err, "Cannot mark submission failure");
                    }
                }
                return Err(err.into());
            }
        };

        let view = match existing {
            Some(view) => view,
            None => resolve_view(self.views.as_ref(), &self.factory, None)?,
        };
        let handle = self.factory.start(&view, result_id.clone())?;

        tracing::info!(
            view_id = %view.id(),
            result_id = %result_id,
            generation = handle.generation,
            "Assessment submitted, polling started"
        );

        Ok(SessionStartedResponse {
            view_id: view.id(),
            result_id,
            generation: handle.generation,
            max_attempts: self.factory.max_attempts(),
        })
    }
}

/// WatchResult Handler - 为已知结果标识开启轮询
pub struct WatchResultHandler {
    factory: Arc<ReportViewFactory>,
    views: Arc<dyn ViewRegistryPort>,
}

impl WatchResultHandler {
    pub fn new(factory: Arc<ReportViewFactory>, views: Arc<dyn ViewRegistryPort>) -> Self {
        Self { factory, views }
    }

    pub async fn handle(&self, cmd: WatchResultCommand) -> Result<SessionStartedResponse, ApplicationError> {
        let view = resolve_view(self.views.as_ref(), &self.factory, cmd.view_id)?;
        let handle = self.factory.start(&view, cmd.result_id.clone())?;

        tracing::info!(
            view_id = %view.id(),
            result_id = %cmd.result_id,
            generation = handle.generation,
            "Watching analysis result"
        );

        Ok(SessionStartedResponse {
            view_id: view.id(),
            result_id: cmd.result_id,
            generation: handle.generation,
            max_attempts: self.factory.max_attempts(),
        })
    }
}
