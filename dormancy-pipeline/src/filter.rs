use crate::error::PipelineResult;
use crate::util;

/// Candidates split by a filter. Removed candidates are kept for logging
/// and tests; later stages only see `kept`.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

impl<C> FilterResult<C> {
    /// Split `candidates` on `keep`, preserving input order on both sides.
    pub fn partition<F>(candidates: Vec<C>, keep: F) -> Self
    where
        F: FnMut(&C) -> bool,
    {
        let (kept, removed): (Vec<C>, Vec<C>) = candidates.into_iter().partition(keep);
        Self { kept, removed }
    }
}

/// One narrowing step over a stage's candidates. Filters run in order.
pub trait Filter<Q, C>: Send + Sync {
    /// Skip this filter for some queries.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    fn filter(&self, query: &Q, candidates: Vec<C>) -> PipelineResult<FilterResult<C>>;

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
