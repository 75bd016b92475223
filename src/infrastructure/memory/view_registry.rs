//! In-Memory View Registry Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{ViewError, ViewRegistryPort};
use crate::application::presentation::{ReportView, ViewId};

/// 内存视图注册表
pub struct InMemoryViewRegistry {
    views: DashMap<ViewId, Arc<ReportView>>,
}

impl InMemoryViewRegistry {
    pub fn new() -> Self {
        Self {
            views: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Default for InMemoryViewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRegistryPort for InMemoryViewRegistry {
    fn insert(&self, view: Arc<ReportView>) -> Result<(), ViewError> {
        let view_id = view.id();
        if self.views.contains_key(&view_id) {
            return Err(ViewError::AlreadyExists(view_id));
        }
        self.views.insert(view_id, view);
        tracing::debug!(view_id = %view_id, "View registered");
        Ok(())
    }

    fn get(&self, id: &ViewId) -> Result<Arc<ReportView>, ViewError> {
        self.views
            .get(id)
            .map(|v| Arc::clone(v.value()))
            .ok_or(ViewError::NotFound(*id))
    }

    fn remove(&self, id: &ViewId) -> Option<Arc<ReportView>> {
        self.views.remove(id).map(|(_, view)| {
            tracing::debug!(view_id = %id, "View removed");
            view
        })
    }

    fn get_expired_views(&self, idle_timeout_secs: u64) -> Vec<ViewId> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.views
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.value().last_activity();
                if elapsed > timeout {
                    Some(*entry.key())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<ViewId> {
        self.views.iter().map(|e| *e.key()).collect()
    }
}
