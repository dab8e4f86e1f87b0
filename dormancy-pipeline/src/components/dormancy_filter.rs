use crate::error::PipelineResult;
use crate::filter::{Filter, FilterResult};
use crate::query::AnalysisQuery;
use crate::types::CustomerAggregate;

/// Keeps customers whose last order falls inside the lookback window but
/// before the recency threshold.
///
/// A customer ordering exactly on the threshold date is still active.
pub struct DormancyFilter;

impl Filter<AnalysisQuery, CustomerAggregate> for DormancyFilter {
    fn filter(
        &self,
        query: &AnalysisQuery,
        candidates: Vec<CustomerAggregate>,
    ) -> PipelineResult<FilterResult<CustomerAggregate>> {
        Ok(FilterResult::partition(candidates, |c| {
            query.window.is_dormant(c.last_order_date)
        }))
    }
}
