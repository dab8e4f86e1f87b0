use crate::util;

/// Input provided to side effects once the pipeline has built its result.
pub struct SideEffectInput<'a, Q, R> {
    pub query: &'a Q,
    pub result: &'a R,
}

/// A side effect is an action that runs after the result is assembled and
/// does not affect it. Examples: persisting the result, writing an export.
///
/// A failing side effect is logged by the pipeline; the run still succeeds.
pub trait SideEffect<Q, R>: Send + Sync {
    /// Decide if this side effect should run.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Execute the side effect.
    fn run(&self, input: &SideEffectInput<'_, Q, R>) -> Result<(), String>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
