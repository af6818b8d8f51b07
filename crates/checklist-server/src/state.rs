//! Server state management.

use std::sync::Arc;

use checklist_core::config::ChecklistConfig;
use checklist_core::error::ChecklistResult;
use checklist_core::pipeline::ChecklistPipeline;
use checklist_readers::ReaderRegistry;

use crate::factory::create_pipeline;

/// Shared application state. Requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChecklistPipeline>,
    pub readers: Arc<ReaderRegistry>,
}

impl AppState {
    /// Create state from configuration with the default readers.
    pub fn from_config(config: ChecklistConfig) -> ChecklistResult<Self> {
        let readers = ReaderRegistry::with_defaults();
        let pipeline = create_pipeline(config, &readers)?;
        Ok(Self::new(pipeline, readers))
    }

    pub fn new(pipeline: ChecklistPipeline, readers: ReaderRegistry) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            readers: Arc::new(readers),
        }
    }

    /// Whether AI extraction is available.
    pub fn ai_enabled(&self) -> bool {
        self.pipeline.has_ai()
    }
}
