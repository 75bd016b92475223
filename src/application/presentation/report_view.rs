//! 报告视图与会话驱动
//!
//! 每次开启会话都会递增视图的 generation 并取消上一个会话的令牌；
//! 携带旧 generation 的状态写入一律丢弃。

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ViewState;
use crate::application::polling::{PollOptions, PollRequest, ResultPoller};
use crate::application::ports::{ViewError, ViewEventSink};
use crate::domain::analysis::ResultId;

/// 视图标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ViewId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ViewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 视图快照
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub view_id: ViewId,
    pub generation: u64,
    pub result_id: Option<ResultId>,
    pub state: ViewState,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

struct ViewInner {
    generation: u64,
    state: ViewState,
    result_id: Option<ResultId>,
    cancel: Option<CancellationToken>,
    closed: bool,
    last_activity: DateTime<Utc>,
}

/// 报告视图
///
/// 同一视图可以先后承载多个轮询会话，但只有最新会话的进度和终态可见。
pub struct ReportView {
    id: ViewId,
    created_at: DateTime<Utc>,
    inner: Mutex<ViewInner>,
    events: Arc<dyn ViewEventSink>,
}

impl ReportView {
    pub fn new(events: Arc<dyn ViewEventSink>) -> Self {
        Self::with_id(ViewId::new(), events)
    }

    pub fn with_id(id: ViewId, events: Arc<dyn ViewEventSink>) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            inner: Mutex::new(ViewInner {
                generation: 0,
                state: ViewState::Idle,
                result_id: None,
                cancel: None,
                closed: false,
                last_activity: now,
            }),
            events,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let inner = self.lock();
        ViewSnapshot {
            view_id: self.id,
            generation: inner.generation,
            result_id: inner.result_id.clone(),
            state: inner.state.clone(),
            closed: inner.closed,
            created_at: self.created_at,
            last_activity: inner.last_activity,
        }
    }

    pub fn state(&self) -> ViewState {
        self.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn last_result_id(&self) -> Option<ResultId> {
        self.lock().result_id.clone()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.lock().last_activity
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// 更新最后活动时间
    pub fn touch(&self) {
        self.lock().last_activity = Utc::now();
    }

    /// 开启新会话：取消旧会话，generation + 1，进入 Polling
    pub fn begin_session(
        &self,
        result_id: ResultId,
        max_attempts: u32,
    ) -> Result<(u64, CancellationToken), ViewError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(ViewError::InvalidOperation(format!("view {} is closed", self.id)));
        }
        if let Some(previous) = inner.cancel.take() {
            previous.cancel();
        }

        let token = CancellationToken::new();
        inner.generation += 1;
        inner.result_id = Some(result_id);
        inner.cancel = Some(token.clone());
        inner.state = ViewState::polling(0, max_attempts);
        inner.last_activity = Utc::now();

        self.events
            .publish_state(&self.id, inner.generation, &inner.state);
        Ok((inner.generation, token))
    }

    /// 写入状态；generation 过期或视图已关闭时丢弃并返回 `false`
    pub fn apply(&self, generation: u64, state: ViewState) -> bool {
        let mut inner = self.lock();
        if inner.closed || generation != inner.generation {
            tracing::debug!(
                view_id = %self.id,
                generation,
                current_generation = inner.generation,
                "Dropping stale view update"
            );
            return false;
        }

        if state.is_terminal() {
            inner.cancel = None;
        }
        inner.state = state;
        inner.last_activity = Utc::now();
        self.events.publish_state(&self.id, generation, &inner.state);
        true
    }

    /// 提交未能确认：取消进行中的会话并进入 SubmissionFailed
    pub fn mark_submission_failed(&self) -> Result<u64, ViewError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(ViewError::InvalidOperation(format!("view {} is closed", self.id)));
        }
        if let Some(previous) = inner.cancel.take() {
            previous.cancel();
        }

        // 未确认的提交不能沿用上一次的结果标识
        inner.generation += 1;
        inner.result_id = None;
        inner.state = ViewState::submission_failed();
        inner.last_activity = Utc::now();
        self.events
            .publish_state(&self.id, inner.generation, &inner.state);
        Ok(inner.generation)
    }

    /// 关闭视图：取消轮询，之后的所有状态写入都会被丢弃
    pub fn teardown(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
        drop(inner);

        tracing::info!(view_id = %self.id, "Report view torn down");
        self.events.publish_closed(&self.id);
    }
}

/// 后台会话句柄
pub struct SessionHandle {
    pub generation: u64,
    pub join: JoinHandle<()>,
}

/// 创建视图并驱动轮询会话
pub struct ReportViewFactory {
    poller: Arc<ResultPoller>,
    max_attempts: u32,
    events: Arc<dyn ViewEventSink>,
}

impl ReportViewFactory {
    pub fn new(poller: Arc<ResultPoller>, max_attempts: u32, events: Arc<dyn ViewEventSink>) -> Self {
        Self {
            poller,
            max_attempts,
            events,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn create_view(&self) -> Arc<ReportView> {
        let view = Arc::new(ReportView::new(self.events.clone()));
        tracing::info!(view_id = %view.id(), "Report view created");
        view
    }

    /// 为视图开启新的轮询会话（从第 1 次尝试开始）
    pub fn start(&self, view: &Arc<ReportView>, result_id: ResultId) -> Result<SessionHandle, ViewError> {
        let (generation, cancel) = view.begin_session(result_id.clone(), self.max_attempts)?;

        tracing::info!(
            view_id = %view.id(),
            generation,
            result_id = %result_id,
            max_attempts = self.max_attempts,
            "Poll session started"
        );

        let progress_view = Arc::clone(view);
        let options = PollOptions::new(self.max_attempts).with_progress(move |attempt, max| {
            progress_view.apply(generation, ViewState::polling(attempt, max));
        });

        let poller = Arc::clone(&self.poller);
        let view = Arc::clone(view);
        let request = PollRequest::new(result_id);

        let join = tokio::spawn(async move {
            let state = match poller.poll(&request, &options, &cancel).await {
                Ok(success) => {
                    let analysis = success.analysis.as_ref();
                    tracing::info!(
                        view_id = %view.id(),
                        generation,
                        attempts = success.stats.attempts,
                        has_summary = analysis.and_then(|a| a.summary()).is_some(),
                        confidence = ?analysis.and_then(|a| a.confidence_score()),
                        recommendations = analysis.map_or(0, |a| a.recommendations().len()),
                        "Poll session succeeded"
                    );
                    Some(ViewState::from_success(success))
                }
                Err(err) => {
                    tracing::info!(
                        view_id = %view.id(),
                        generation,
                        error = %err,
                        "Poll session ended without result"
                    );
                    ViewState::from_poll_error(&err)
                }
            };

            if let Some(state) = state {
                view.apply(generation, state);
            }
        });

        Ok(SessionHandle { generation, join })
    }

    /// 以视图上次的结果标识重新开始，仅限超时或失败的视图
    pub fn retry(&self, view: &Arc<ReportView>) -> Result<SessionHandle, ViewError> {
        let state = view.state();
        if !state.is_retryable() {
            return Err(ViewError::InvalidOperation(format!(
                "view {} cannot be retried in its current state",
                view.id()
            )));
        }
        let result_id = view.last_result_id().ok_or_else(|| {
            ViewError::InvalidOperation(format!("view {} has no result to retry", view.id()))
        })?;
        self.start(view, result_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::polling::PollerConfig;
    use crate::application::ports::BackendError;
    use crate::infrastructure::adapters::backend::FakeBackendClient;
    use crate::application::presentation::{MSG_EMPTY, MSG_TIMED_OUT};
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<Vec<(u64, ViewState)>>,
        closed: Mutex<u32>,
    }

    impl ViewEventSink for RecordingSink {
        fn publish_state(&self, _view_id: &ViewId, generation: u64, state: &ViewState) {
            self.states.lock().unwrap().push((generation, state.clone()));
        }

        fn publish_closed(&self, _view_id: &ViewId) {
            *self.closed.lock().unwrap() += 1;
        }
    }

    fn factory(backend: Arc<FakeBackendClient>, max_attempts: u32, sink: Arc<RecordingSink>) -> ReportViewFactory {
        let poller = Arc::new(ResultPoller::new(backend, PollerConfig::default()));
        ReportViewFactory::new(poller, max_attempts, sink)
    }

    fn rid(id: &str) -> ResultId {
        ResultId::new(id).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_reaches_report() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            Ok(FakeBackendClient::pending_body()),
            Ok(FakeBackendClient::completed_body()),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let factory = factory(backend, 5, sink.clone());

        let view = factory.create_view();
        let handle = factory.start(&view, rid("s-1")).unwrap();
        handle.join.await.unwrap();

        assert!(matches!(view.state(), ViewState::Report { .. }));
        let states: Vec<ViewState> = sink.states.lock().unwrap().iter().map(|(_, s)| s.clone()).collect();
        assert_eq!(states[0], ViewState::polling(0, 5));
        assert_eq!(states[1], ViewState::polling(1, 5));
        assert_eq!(states[2], ViewState::polling(2, 5));
        assert!(matches!(states[3], ViewState::Report { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_without_analysis_is_empty() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![Ok(json!({
            "success": true,
            "data": {"status": "completed"}
        }))]));
        let factory = factory(backend, 5, Arc::new(RecordingSink::default()));

        let view = factory.create_view();
        factory.start(&view, rid("s-1")).unwrap().join.await.unwrap();

        assert_eq!(
            view.state(),
            ViewState::Empty {
                message: MSG_EMPTY.to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_then_retry_starts_fresh() {
        let backend = Arc::new(FakeBackendClient::new());
        let sink = Arc::new(RecordingSink::default());
        let factory = factory(backend.clone(), 2, sink.clone());

        let view = factory.create_view();
        factory.start(&view, rid("s-1")).unwrap().join.await.unwrap();
        assert_eq!(
            view.state(),
            ViewState::TimedOut {
                message: MSG_TIMED_OUT.to_string(),
                attempts: 2
            }
        );

        let retry = factory.retry(&view).unwrap();
        assert_eq!(retry.generation, 2);
        assert_eq!(view.state(), ViewState::polling(0, 2));
        retry.join.await.unwrap();

        assert_eq!(backend.fetch_calls(), 4);
        let attempts: Vec<u32> = sink
            .states
            .lock()
            .unwrap()
            .iter()
            .filter(|(generation, _)| *generation == 2)
            .filter_map(|(_, s)| match s {
                ViewState::Polling { current_attempt, .. } => Some(*current_attempt),
                _ => None,
            })
            .collect();
        assert_eq!(attempts, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_session_suppresses_stale_updates() {
        let backend = Arc::new(FakeBackendClient::new());
        let sink = Arc::new(RecordingSink::default());
        let factory = factory(backend, 3, sink.clone());

        let view = factory.create_view();
        let first = factory.start(&view, rid("old")).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        let second = factory.start(&view, rid("new")).unwrap();

        first.join.await.unwrap();
        assert!(!view.apply(first.generation, ViewState::polling(9, 9)));

        second.join.await.unwrap();
        assert_eq!(view.last_result_id(), Some(rid("new")));
        assert!(matches!(view.state(), ViewState::TimedOut { .. }));
        assert!(sink
            .states
            .lock()
            .unwrap()
            .iter()
            .filter(|(generation, _)| *generation == first.generation)
            .all(|(_, s)| !s.is_terminal()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_session() {
        let backend = Arc::new(FakeBackendClient::new());
        let sink = Arc::new(RecordingSink::default());
        let factory = factory(backend.clone(), 20, sink.clone());

        let view = factory.create_view();
        let handle = factory.start(&view, rid("s-1")).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        view.teardown();
        handle.join.await.unwrap();

        assert_eq!(backend.fetch_calls(), 1);
        assert!(view.is_closed());
        assert_eq!(*sink.closed.lock().unwrap(), 1);
        assert!(factory.start(&view, rid("s-2")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_maps_to_failed() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![Err(BackendError::Timeout)]));
        let factory = factory(backend, 1, Arc::new(RecordingSink::default()));

        let view = factory.create_view();
        factory.start(&view, rid("s-1")).unwrap().join.await.unwrap();
        assert!(matches!(view.state(), ViewState::Failed { .. }));
        assert!(view.state().is_retryable());
    }

    #[tokio::test]
    async fn test_submission_failed_and_retry_without_result() {
        let factory = factory(Arc::new(FakeBackendClient::new()), 3, Arc::new(RecordingSink::default()));
        let view = factory.create_view();

        assert!(factory.retry(&view).is_err());
        view.mark_submission_failed().unwrap();
        assert_eq!(view.state(), ViewState::submission_failed());
        assert_eq!(view.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_forgets_previous_result() {
        let backend = Arc::new(FakeBackendClient::ready_after(0));
        let factory = factory(backend.clone(), 3, Arc::new(RecordingSink::default()));

        let view = factory.create_view();
        factory.start(&view, rid("old-1")).unwrap().join.await.unwrap();
        assert!(matches!(view.state(), ViewState::Report { .. }));

        view.mark_submission_failed().unwrap();
        assert_eq!(view.last_result_id(), None);
        assert!(matches!(
            factory.retry(&view),
            Err(ViewError::InvalidOperation(_))
        ));
        assert_eq!(view.generation(), 2);
        assert_eq!(view.state(), ViewState::submission_failed());
        assert_eq!(backend.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_rejected_while_report_shown() {
        let backend = Arc::new(FakeBackendClient::ready_after(0));
        let factory = factory(backend.clone(), 3, Arc::new(RecordingSink::default()));

        let view = factory.create_view();
        factory.start(&view, rid("s-1")).unwrap().join.await.unwrap();

        assert!(factory.retry(&view).is_err());
        assert_eq!(view.generation(), 1);
        assert_eq!(backend.fetch_calls(), 1);
    }
}
