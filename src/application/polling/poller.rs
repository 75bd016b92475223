//! Result Poller - 分析结果轮询状态机
//!
//! `Idle -> Polling -> {Succeeded, Failed, TimedOut}`
//!
//! 每次尝试先回调进度，再请求结果；除了 `completed` 信封以外的任何结果都让会话继续，
//! 直到尝试次数耗尽。请求和等待是仅有的两个挂起点，二者都与取消令牌竞争。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::outcome::{AttemptOutcome, NotReadyReason};
use super::schedule::staged_wait;
use crate::application::ports::BackendApiPort;
use crate::domain::analysis::{AnalysisResult, ResultId};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// 进度回调：`(当前尝试, 最大尝试次数)`
pub type ProgressCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// 轮询目标，一次会话内不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    result_id: ResultId,
}

impl PollRequest {
    pub fn new(result_id: ResultId) -> Self {
        Self { result_id }
    }

    pub fn result_id(&self) -> &ResultId {
        &self.result_id
    }
}

/// 单次会话的选项
#[derive(Clone)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub on_progress: Option<ProgressCallback>,
}

impl PollOptions {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            on_progress: None,
        }
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u32, u32) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl std::fmt::Debug for PollOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollOptions")
            .field("max_attempts", &self.max_attempts)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// 轮询器配置（所有会话共享）
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 429 且没有 Retry-After 时的等待时长
    pub rate_limit_fallback: Duration,
    /// Retry-After 的上限
    pub rate_limit_max_wait: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            rate_limit_fallback: Duration::from_secs(30),
            rate_limit_max_wait: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// 分段时间表
    Staged,
    /// 429 退避，不占用分段时间表
    RateLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRecord {
    pub after_attempt: u32,
    pub kind: WaitKind,
    pub duration: Duration,
}

/// 会话诊断信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    pub attempts: u32,
    pub waits: Vec<WaitRecord>,
}

impl PollStats {
    pub fn total_wait(&self) -> Duration {
        self.waits.iter().map(|w| w.duration).sum()
    }

    pub fn waits_of(&self, kind: WaitKind) -> impl Iterator<Item = &WaitRecord> {
        self.waits.iter().filter(move |w| w.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct PollSuccess {
    /// `None` 表示后端声明完成但报告缺失
    pub analysis: Option<AnalysisResult>,
    pub stats: PollStats,
}

/// 会话终止错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// 正常的超时出口：分析可能仍在进行
    #[error("Result not ready after {attempts} attempts ({total_wait:?} waited)")]
    ExhaustedAttempts { attempts: u32, total_wait: Duration },

    /// 最后一次尝试遇到瞬时错误
    #[error("Attempt {attempt} failed: {message}")]
    Transient { attempt: u32, message: String },

    #[error("Attempt {attempt} cannot be retried: {message}")]
    Fatal { attempt: u32, message: String },

    #[error("Polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("Invalid poll options: {0}")]
    InvalidOptions(String),
}

/// 结果轮询器
///
/// 每个会话严格串行：同一时刻最多一个在途请求。会话之间没有共享可变状态。
pub struct ResultPoller {
    backend: Arc<dyn BackendApiPort>,
    config: PollerConfig,
}

impl ResultPoller {
    pub fn new(backend: Arc<dyn BackendApiPort>, config: PollerConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// 运行一个完整的轮询会话
    pub async fn poll(
        &self,
        request: &PollRequest,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<PollSuccess, PollError> {
        let max_attempts = options.max_attempts;
        if max_attempts == 0 {
            return Err(PollError::InvalidOptions(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        let result_id = request.result_id();
        let mut stats = PollStats::default();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(self.cancelled(result_id, &stats));
            }

            report_progress(options, attempt, max_attempts);
            stats.attempts = attempt;

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(result_id, &stats)),
                response = self.backend.fetch_analysis_result(result_id) => response,
            };

            let (kind, duration) = match AttemptOutcome::from_response(response) {
                AttemptOutcome::Completed { payload } => {
                    tracing::info!(
                        result_id = %result_id,
                        attempt,
                        has_analysis = payload.is_some(),
                        total_wait_ms = stats.total_wait().as_millis() as u64,
                        "Analysis result completed"
                    );
                    return Ok(PollSuccess {
                        analysis: payload,
                        stats,
                    });
                }
                AttemptOutcome::NotReady { reason } => {
                    match reason {
                        NotReadyReason::Pending(status) => tracing::debug!(
                            result_id = %result_id,
                            attempt,
                            status = %status,
                            "Analysis result not ready"
                        ),
                        NotReadyReason::Unrecognized(reason) => tracing::warn!(
                            result_id = %result_id,
                            attempt,
                            reason = %reason,
                            "Unrecognized result envelope, treating as not ready"
                        ),
                    }
                    (WaitKind::Staged, staged_wait(attempt))
                }
                AttemptOutcome::RateLimited { retry_after_secs } => {
                    let wait = self.rate_limit_wait(retry_after_secs);
                    tracing::warn!(
                        result_id = %result_id,
                        attempt,
                        retry_after_secs = ?retry_after_secs,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited by backend"
                    );
                    (WaitKind::RateLimit, wait)
                }
                AttemptOutcome::TransientError { message } => {
                    if attempt == max_attempts {
                        tracing::error!(
                            result_id = %result_id,
                            attempt,
                            error = %message,
                            "Final attempt failed"
                        );
                        return Err(PollError::Transient { attempt, message });
                    }
                    tracing::warn!(
                        result_id = %result_id,
                        attempt,
                        error = %message,
                        "Attempt failed, will retry"
                    );
                    (WaitKind::Staged, staged_wait(attempt))
                }
                AttemptOutcome::FatalError { message } => {
                    tracing::error!(
                        result_id = %result_id,
                        attempt,
                        error = %message,
                        "Non-retryable polling error"
                    );
                    return Err(PollError::Fatal { attempt, message });
                }
            };

            if attempt == max_attempts {
                break;
            }

            tracing::debug!(
                result_id = %result_id,
                attempt,
                kind = ?kind,
                wait_ms = duration.as_millis() as u64,
                "Waiting before next attempt"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(result_id, &stats)),
                _ = tokio::time::sleep(duration) => {}
            }

            stats.waits.push(WaitRecord {
                after_attempt: attempt,
                kind,
                duration,
            });
        }

        let total_wait = stats.total_wait();
        tracing::warn!(
            result_id = %result_id,
            attempts = stats.attempts,
            total_wait_ms = total_wait.as_millis() as u64,
            "Polling attempts exhausted"
        );
        Err(PollError::ExhaustedAttempts {
            attempts: stats.attempts,
            total_wait,
        })
    }

    fn rate_limit_wait(&self, retry_after_secs: Option<u64>) -> Duration {
        match retry_after_secs {
            Some(secs) => Duration::from_secs(secs).min(self.config.rate_limit_max_wait),
            None => self.config.rate_limit_fallback,
        }
    }

    fn cancelled(&self, result_id: &ResultId, stats: &PollStats) -> PollError {
        tracing::info!(
            result_id = %result_id,
            attempts = stats.attempts,
            "Polling cancelled"
        );
        PollError::Cancelled {
            attempts: stats.attempts,
        }
    }
}

/// 回调中的 panic 不能中断轮询
fn report_progress(options: &PollOptions, attempt: u32, max_attempts: u32) {
    let Some(callback) = options.on_progress.as_ref() else {
        return;
    };
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback(attempt, max_attempts))).is_err() {
        tracing::warn!(attempt, max_attempts, "Progress callback panicked, ignoring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::polling::WaitBand;
    use crate::application::ports::BackendError;
    use crate::infrastructure::adapters::backend::FakeBackendClient;
    use serde_json::json;
    use std::sync::Mutex;

    fn not_found() -> Result<serde_json::Value, BackendError> {
        Ok(FakeBackendClient::pending_body())
    }

    fn completed() -> Result<serde_json::Value, BackendError> {
        Ok(FakeBackendClient::completed_body())
    }

    fn request() -> PollRequest {
        PollRequest::new(ResultId::new("survey-42").unwrap())
    }

    fn recorder() -> (Arc<Mutex<Vec<(u32, u32)>>>, PollOptions) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let options = PollOptions::default().with_progress(move |attempt, max| {
            sink.lock().unwrap().push((attempt, max));
        });
        (calls, options)
    }

    fn poller(backend: Arc<FakeBackendClient>) -> ResultPoller {
        ResultPoller::new(backend, PollerConfig::default())
    }

    fn assert_in_band(record: &WaitRecord) {
        let range = WaitBand::for_attempt(record.after_attempt).range_ms();
        let ms = record.duration.as_millis() as u64;
        assert!(range.contains(&ms), "{:?} outside {:?}", record, range);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_not_found_exhausts() {
        for max_attempts in [1u32, 3, 7] {
            let backend = Arc::new(FakeBackendClient::new());
            let (calls, options) = recorder();
            let options = PollOptions {
                max_attempts,
                ..options
            };

            let err = poller(backend.clone())
                .poll(&request(), &options, &CancellationToken::new())
                .await
                .unwrap_err();

            match err {
                PollError::ExhaustedAttempts { attempts, .. } => assert_eq!(attempts, max_attempts),
                other => panic!("unexpected error: {:?}", other),
            }
            let expected: Vec<(u32, u32)> = (1..=max_attempts).map(|i| (i, max_attempts)).collect();
            assert_eq!(*calls.lock().unwrap(), expected);
            assert_eq!(backend.fetch_calls(), max_attempts);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_on_third_attempt() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            not_found(),
            not_found(),
            completed(),
        ]));
        let (calls, options) = recorder();
        let options = PollOptions {
            max_attempts: 3,
            ..options
        };

        let success = poller(backend.clone())
            .poll(&request(), &options, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 3);
        assert_eq!(backend.fetch_calls(), 3);
        assert_eq!(success.stats.attempts, 3);
        assert_eq!(success.stats.waits.len(), 2);
        for wait in &success.stats.waits {
            assert_eq!(wait.kind, WaitKind::Staged);
            assert_in_band(wait);
            assert!(wait.duration >= Duration::from_millis(10_000));
            assert!(wait.duration < Duration::from_millis(12_000));
        }
        assert!(success.analysis.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_stops_immediately() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![completed()]));
        let success = poller(backend.clone())
            .poll(&request(), &PollOptions::new(10), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.fetch_calls(), 1);
        assert!(success.stats.waits.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_uses_retry_after() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            Err(BackendError::RateLimited {
                retry_after_secs: Some(5),
            }),
            completed(),
        ]));

        let started = tokio::time::Instant::now();
        let success = poller(backend)
            .poll(&request(), &PollOptions::new(5), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            success.stats.waits,
            vec![WaitRecord {
                after_attempt: 1,
                kind: WaitKind::RateLimit,
                duration: Duration::from_secs(5),
            }]
        );
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_fallback_and_cap() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            Err(BackendError::RateLimited {
                retry_after_secs: None,
            }),
            Err(BackendError::RateLimited {
                retry_after_secs: Some(86_400),
            }),
            completed(),
        ]));

        let success = poller(backend)
            .poll(&request(), &PollOptions::new(5), &CancellationToken::new())
            .await
            .unwrap();

        let durations: Vec<Duration> = success.stats.waits.iter().map(|w| w.duration).collect();
        assert_eq!(durations, vec![Duration::from_secs(30), Duration::from_secs(300)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_keeps_band_keyed_by_attempt() {
        let mut script: Vec<_> = (0..5)
            .map(|_| {
                Err(BackendError::RateLimited {
                    retry_after_secs: Some(1),
                })
            })
            .collect();
        script.push(not_found());
        script.push(completed());
        let backend = Arc::new(FakeBackendClient::new().with_script(script));

        let success = poller(backend)
            .poll(&request(), &PollOptions::new(10), &CancellationToken::new())
            .await
            .unwrap();

        let staged: Vec<&WaitRecord> = success.stats.waits_of(WaitKind::Staged).collect();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].after_attempt, 6);
        assert_eq!(WaitBand::for_attempt(6), WaitBand::Steady);
        assert_in_band(staged[0]);
        assert_eq!(success.stats.waits_of(WaitKind::RateLimit).count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            Err(BackendError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            }),
            Err(BackendError::Unreachable("connection refused".to_string())),
            Ok(json!({"success": true, "data": {"status": "weird"}})),
            completed(),
        ]));

        let success = poller(backend.clone())
            .poll(&request(), &PollOptions::new(5), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.fetch_calls(), 4);
        assert_eq!(success.stats.waits_of(WaitKind::Staged).count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_on_last_attempt_propagates() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![
            not_found(),
            Err(BackendError::Status {
                status: 500,
                message: "boom".to_string(),
            }),
        ]));

        let err = poller(backend)
            .poll(&request(), &PollOptions::new(2), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PollError::Transient {
                attempt: 2,
                message: "HTTP 500: boom".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_on_last_attempt_exhausts_without_wait() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![Err(
            BackendError::RateLimited {
                retry_after_secs: Some(5),
            },
        )]));

        let started = tokio::time::Instant::now();
        let err = poller(backend)
            .poll(&request(), &PollOptions::new(1), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PollError::ExhaustedAttempts {
                attempts: 1,
                total_wait: Duration::ZERO
            }
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_session() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![Err(
            BackendError::InvalidRequest("bad base url".to_string()),
        )]));

        let err = poller(backend.clone())
            .poll(&request(), &PollOptions::new(5), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Fatal { attempt: 1, .. }));
        assert_eq!(backend.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_third_attempt() {
        let cancel = CancellationToken::new();
        let hook_token = cancel.clone();
        let backend = Arc::new(FakeBackendClient::new().with_fetch_hook(move |call| {
            if call == 3 {
                hook_token.cancel();
            }
        }));
        let (calls, options) = recorder();
        let options = PollOptions {
            max_attempts: 10,
            ..options
        };

        let err = poller(backend.clone())
            .poll(&request(), &options, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, PollError::Cancelled { attempts: 3 });
        assert_eq!(backend.fetch_calls(), 3);
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let cancel = CancellationToken::new();
        let backend = Arc::new(FakeBackendClient::new());
        let poller = poller(backend.clone());

        let session_cancel = cancel.clone();
        let session = tokio::spawn(async move {
            poller
                .poll(&request(), &PollOptions::new(10), &session_cancel)
                .await
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        cancel.cancel();

        let err = session.await.unwrap().unwrap_err();
        assert_eq!(err, PollError::Cancelled { attempts: 1 });
        assert_eq!(backend.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_callback_does_not_abort() {
        let backend = Arc::new(FakeBackendClient::new().with_script(vec![not_found(), completed()]));
        let options = PollOptions::new(3).with_progress(|attempt, _| {
            if attempt == 1 {
                panic!("render failed");
            }
        });

        let success = poller(backend.clone())
            .poll(&request(), &options, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(success.stats.attempts, 2);
        assert_eq!(backend.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let backend = Arc::new(FakeBackendClient::new());
        let err = poller(backend.clone())
            .poll(&request(), &PollOptions::new(0), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::InvalidOptions(_)));
        assert_eq!(backend.fetch_calls(), 0);
    }
}
