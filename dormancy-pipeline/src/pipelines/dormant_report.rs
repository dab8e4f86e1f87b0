use crate::aggregator::{aggregate, AssignmentMap};
use crate::components::dormancy_filter::DormancyFilter;
use crate::components::summary_log_side_effect::SummaryLogSideEffect;
use crate::components::value_at_risk_selector::ValueAtRiskSelector;
use crate::config::AnalysisConfig;
use crate::dormancy;
use crate::enrichment::enrich;
use crate::error::{PipelineError, PipelineResult};
use crate::filter::Filter;
use crate::forecast;
use crate::insights::{self, InsightInputs};
use crate::query::AnalysisQuery;
use crate::report::{AnalysisResult, ReportSummary};
use crate::rollups;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{AssignmentRecord, CustomerAggregate, TransactionRecord};

/// One analysis run over two in-memory tables.
#[derive(Clone, Debug, Default)]
pub struct AnalysisRequest {
    pub request_id: String,
    pub transactions: Vec<TransactionRecord>,
    pub assignments: Vec<AssignmentRecord>,
}

/// The full dormant customer report.
///
/// Pipeline flow:
/// 1. Aggregate rows per customer around the data-derived reference date
/// 2. DormancyFilter keeps customers inside the dormancy window
/// 3. Churn risk and lifetime value scoring
/// 4. Enrichment: seasonal pattern, product preferences, win-back, segment
/// 5. ValueAtRiskSelector orders customers and salesperson summaries
/// 6. Roll-ups, forecast and insights
/// 7. Side effects (summary log by default, plus any injected)
pub struct DormantReportPipeline {
    config: AnalysisConfig,
    filters: Vec<Box<dyn Filter<AnalysisQuery, CustomerAggregate>>>,
    selector: ValueAtRiskSelector,
    side_effects: Vec<Box<dyn SideEffect<AnalysisQuery, AnalysisResult>>>,
}

impl DormantReportPipeline {
    pub fn new(config: AnalysisConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            filters: vec![Box::new(DormancyFilter)],
            selector: ValueAtRiskSelector::default(),
            side_effects: vec![Box::new(SummaryLogSideEffect)],
        })
    }

    /// Add a side effect that runs after every successful report.
    pub fn with_side_effect(
        mut self,
        side_effect: Box<dyn SideEffect<AnalysisQuery, AnalysisResult>>,
    ) -> Self {
        self.side_effects.push(side_effect);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, request: &AnalysisRequest) -> PipelineResult<AnalysisResult> {
        let assignments = AssignmentMap::from_records(&request.assignments);
        log::debug!(
            "request_id={} starting with {} transactions, {} assignments",
            request.request_id,
            request.transactions.len(),
            assignments.len()
        );

        let aggregation = aggregate(&request.transactions, &assignments, &self.config)?;
        let query = AnalysisQuery::new(
            request.request_id.clone(),
            aggregation.window,
            self.config.clone(),
        );
        let customers_in_window = aggregation.customers.len();

        let mut candidates: Vec<CustomerAggregate> = aggregation.customers.into_values().collect();
        for filter in self.filters.iter().filter(|f| f.enable(&query)) {
            let before = candidates.len();
            candidates = filter.filter(&query, candidates)?.kept;
            log::debug!(
                "request_id={} {} kept {} of {}",
                query.request_id,
                filter.name(),
                candidates.len(),
                before
            );
        }
        if candidates.is_empty() {
            return Err(PipelineError::NoDormantCustomers {
                window_start: query.window.window_start,
                recency_threshold: query.window.recency_threshold,
            });
        }

        let history = aggregation.history;
        let enhanced: Vec<_> = candidates
            .into_iter()
            .map(dormancy::score)
            .map(|customer| {
                let rows = history
                    .get(&customer.customer)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                enrich(customer, rows, &query)
            })
            .collect();
        let enhanced = self.selector.select(&query, enhanced);
        log::debug!(
            "request_id={} enriched {} dormant customers",
            query.request_id,
            enhanced.len()
        );

        let summaries = self
            .selector
            .select(&query, rollups::salesperson_summaries(&enhanced, &self.config));
        let geography = rollups::geographic_distribution(enhanced.iter().map(|e| &e.customer));
        let segment_counts = rollups::segment_counts(&enhanced);
        let product_insights = rollups::product_insights(&enhanced, &self.config);
        let revenue_forecast = forecast::forecast(&enhanced, query.window.reference_date);
        let insights = insights::generate(&InsightInputs {
            summaries: &summaries,
            customers: &enhanced,
            forecast: &revenue_forecast,
            geography: &geography,
            config: &self.config,
        });
        let rep_performance = insights::rep_performance(&summaries);
        let summary = ReportSummary::from_parts(
            &query.window,
            customers_in_window,
            enhanced.iter().map(|e| &e.customer),
            &summaries,
        );

        let result = AnalysisResult {
            request_id: query.request_id.clone(),
            summary,
            salesperson_summaries: summaries,
            dormant_customers: enhanced,
            insights,
            rep_performance,
            data_quality: aggregation.quality,
            revenue_forecast,
            segment_counts,
            geographic_distribution: geography,
            product_insights,
        };

        self.run_side_effects(&query, &result);
        Ok(result)
    }

    fn run_side_effects(&self, query: &AnalysisQuery, result: &AnalysisResult) {
        let input = SideEffectInput { query, result };
        for side_effect in self.side_effects.iter().filter(|s| s.enable(query)) {
            if let Err(reason) = side_effect.run(&input) {
                let err = PipelineError::SideEffect {
                    name: side_effect.name().to_string(),
                    reason,
                };
                log::warn!("request_id={} {}", query.request_id, err);
            }
        }
    }
}
