//! View Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::ViewRegistryPort;
use crate::application::presentation::ViewSnapshot;
use crate::application::queries::GetView;

/// GetView Handler
pub struct GetViewHandler {
    views: Arc<dyn ViewRegistryPort>,
}

impl GetViewHandler {
    pub fn new(views: Arc<dyn ViewRegistryPort>) -> Self {
        Self { views }
    }

    pub async fn handle(&self, query: GetView) -> Result<ViewSnapshot, ApplicationError> {
        let view = self.views.get(&query.view_id)?;
        view.touch();
        Ok(view.snapshot())
    }
}
