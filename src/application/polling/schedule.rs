//! 分段等待时间表
//!
//! 等待时长按尝试次数分成四档，每档在基础时长上叠加 `[0, 2000)` 毫秒的均匀抖动，
//! 避免大量客户端同步重试。档位只由尝试序号决定，与已经过的时间无关。

use std::time::Duration;

use rand::Rng;

/// 抖动上限（不含）
pub const MAX_JITTER_MS: u64 = 2_000;

/// 等待档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBand {
    /// 第 1-5 次
    Early,
    /// 第 6-10 次
    Steady,
    /// 第 11-15 次
    Slow,
    /// 第 16 次及以后
    Tail,
}

impl WaitBand {
    /// 根据尝试序号（从 1 开始）确定档位，0 按第 1 次处理
    pub fn for_attempt(attempt: u32) -> Self {
        match attempt {
            0..=5 => WaitBand::Early,
            6..=10 => WaitBand::Steady,
            11..=15 => WaitBand::Slow,
            _ => WaitBand::Tail,
        }
    }

    pub fn base_ms(self) -> u64 {
        match self {
            WaitBand::Early => 10_000,
            WaitBand::Steady => 12_500,
            WaitBand::Slow => 15_000,
            WaitBand::Tail => 17_500,
        }
    }

    /// 该档位可能产生的等待区间 `[min, max)`（毫秒）
    pub fn range_ms(self) -> std::ops::Range<u64> {
        self.base_ms()..self.base_ms() + MAX_JITTER_MS
    }
}

/// 第 `attempt` 次尝试之后的等待时长
pub fn staged_wait(attempt: u32) -> Duration {
    staged_wait_with(attempt, &mut rand::thread_rng())
}

/// 同 [`staged_wait`]，抖动来源由调用方提供
pub fn staged_wait_with<R: Rng + ?Sized>(attempt: u32, rng: &mut R) -> Duration {
    let band = WaitBand::for_attempt(attempt);
    let jitter = rng.gen_range(0..MAX_JITTER_MS);
    Duration::from_millis(band.base_ms() + jitter)
}
