use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{PipelineError, PipelineResult};
use crate::query::AnalysisQuery;
use crate::report::AnalysisResult;
use crate::side_effect::{SideEffect, SideEffectInput};

/// Where finished reports go. Implementations are constructed by the
/// caller and handed to the pipeline; the pipeline never opens one itself.
pub trait ResultStore: Send + Sync {
    fn save(&self, request_id: &str, result: &AnalysisResult) -> PipelineResult<()>;
}

/// Keeps serialized reports in memory, keyed by request id.
#[derive(Default)]
pub struct InMemoryResultStore {
    results: Mutex<BTreeMap<String, String>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored JSON for a request, if any.
    pub fn get(&self, request_id: &str) -> Option<String> {
        self.results
            .lock()
            .ok()
            .and_then(|results| results.get(request_id).cloned())
    }

    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for InMemoryResultStore {
    fn save(&self, request_id: &str, result: &AnalysisResult) -> PipelineResult<()> {
        let json = serde_json::to_string(result)?;
        let mut results = self.results.lock().map_err(|_| PipelineError::SideEffect {
            name: "InMemoryResultStore".into(),
            reason: "store lock poisoned".into(),
        })?;
        results.insert(request_id.to_string(), json);
        Ok(())
    }
}

/// Persists each finished report through a [`ResultStore`].
pub struct PersistResultSideEffect {
    store: Arc<dyn ResultStore>,
}

impl PersistResultSideEffect {
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }
}

impl SideEffect<AnalysisQuery, AnalysisResult> for PersistResultSideEffect {
    fn run(&self, input: &SideEffectInput<'_, AnalysisQuery, AnalysisResult>) -> Result<(), String> {
        self.store
            .save(&input.query.request_id, input.result)
            .map_err(|e| e.to_string())?;
        log::info!("request_id={} persisted report", input.query.request_id);
        Ok(())
    }
}
