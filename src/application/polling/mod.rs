//! Result Polling - 分析结果轮询
//!
//! - schedule: 分段等待时间表（带抖动）
//! - outcome: 单次请求结果分类
//! - poller: 轮询状态机

mod outcome;
mod poller;
mod schedule;

pub use outcome::{AttemptOutcome, NotReadyReason};
pub use poller::{
    PollError, PollOptions, PollRequest, PollStats, PollSuccess, PollerConfig, ProgressCallback,
    ResultPoller, WaitKind, WaitRecord, DEFAULT_MAX_ATTEMPTS,
};
pub use schedule::{staged_wait, staged_wait_with, WaitBand, MAX_JITTER_MS};
