use crate::query::AnalysisQuery;
use crate::report::AnalysisResult;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::util::format_dollars;

/// Logs the headline numbers of a finished run.
pub struct SummaryLogSideEffect;

impl SideEffect<AnalysisQuery, AnalysisResult> for SummaryLogSideEffect {
    fn run(&self, input: &SideEffectInput<'_, AnalysisQuery, AnalysisResult>) -> Result<(), String> {
        let summary = &input.result.summary;
        log::info!(
            "request_id={} reference_date={} dormant={} value_at_risk={} quick_wins={} realistic_recovery={}",
            input.query.request_id,
            summary.reference_date,
            summary.dormant_customer_count,
            format_dollars(summary.total_value_at_risk),
            summary.quick_win_count,
            format_dollars(input.result.revenue_forecast.scenarios.realistic)
        );
        Ok(())
    }
}
