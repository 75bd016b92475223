//! View Sweeper - Idle View Teardown

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::ports::ViewRegistryPort;

/// Sweeper 配置
#[derive(Debug, Clone)]
pub struct ViewSweeperConfig {
    /// 视图空闲超时（秒）
    pub idle_timeout_secs: u64,
    /// 扫描间隔
    pub sweep_interval: Duration,
}

impl Default for ViewSweeperConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            sweep_interval: Duration::from_secs(300),
        }
    }
}

/// 空闲视图清理 Worker
///
/// 被清理的视图会取消进行中的轮询，相当于 UI 离开页面
pub struct ViewSweeper {
    config: ViewSweeperConfig,
    views: Arc<dyn ViewRegistryPort>,
}

impl ViewSweeper {
    pub fn new(config: ViewSweeperConfig, views: Arc<dyn ViewRegistryPort>) -> Self {
        Self { config, views }
    }

    /// 启动 Worker，直到 shutdown 被取消
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            idle_timeout_secs = self.config.idle_timeout_secs,
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            "ViewSweeper started"
        );

        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once();
                }
            }
        }

        tracing::info!("ViewSweeper stopped");
    }

    /// 扫描一次，返回清理的视图数量
    pub fn sweep_once(&self) -> usize {
        let expired = self.views.get_expired_views(self.config.idle_timeout_secs);
        let mut removed = 0;

        for view_id in expired {
            if let Some(view) = self.views.remove(&view_id) {
                view.teardown();
                removed += 1;
                tracing::info!(view_id = %view_id, "Idle view swept");
            }
        }

        if removed > 0 {
            tracing::info!(removed, remaining = self.views.list_all().len(), "View sweep finished");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::presentation::ReportView;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryViewRegistry;

    fn registry_with_view() -> (Arc<InMemoryViewRegistry>, Arc<ReportView>) {
        let registry = InMemoryViewRegistry::new().arc();
        let view = Arc::new(ReportView::new(EventPublisher::new().arc()));
        registry.insert(view.clone()).unwrap();
        (registry, view)
    }

    #[test]
    fn test_sweep_removes_idle_views() {
        let (registry, view) = registry_with_view();
        let sweeper = ViewSweeper::new(
            ViewSweeperConfig {
                idle_timeout_secs: 0,
                ..Default::default()
            },
            registry.clone(),
        );

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(sweeper.sweep_once(), 1);
        assert!(registry.is_empty());
        assert!(view.is_closed());
    }

    #[test]
    fn test_sweep_keeps_active_views() {
        let (registry, view) = registry_with_view();
        let sweeper = ViewSweeper::new(ViewSweeperConfig::default(), registry.clone());

        assert_eq!(sweeper.sweep_once(), 0);
        assert_eq!(registry.len(), 1);
        assert!(!view.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let (registry, _view) = registry_with_view();
        let sweeper = ViewSweeper::new(ViewSweeperConfig::default(), registry);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(sweeper.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_secs(900)).await;
        shutdown.cancel();

        handle.await.unwrap();
    }
}
