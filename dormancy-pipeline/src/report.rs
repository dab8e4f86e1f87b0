//! Result objects returned by the pipelines.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::forecast::RevenueForecast;
use crate::insights::RepPerformance;
use crate::quality::DataQualityReport;
use crate::query::AnalysisWindow;
use crate::rollups::{GeographicSummary, ProductInsights};
use crate::types::{DormantCustomer, EnhancedCustomerData, SalespersonSummary};
use crate::util::ratio;

/// Headline totals for a run.
#[derive(Clone, Debug, Serialize)]
pub struct ReportSummary {
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    pub recency_threshold: NaiveDate,
    /// Customers with at least one order inside the lookback window.
    pub customers_in_window: usize,
    pub dormant_customer_count: usize,
    pub total_value_at_risk: f64,
    pub average_churn_risk: f64,
    pub high_value_dormant_count: usize,
    pub quick_win_count: usize,
    pub salesperson_count: usize,
    pub potential_recovery: f64,
}

impl ReportSummary {
    pub fn from_parts<'a>(
        window: &AnalysisWindow,
        customers_in_window: usize,
        dormant: impl IntoIterator<Item = &'a DormantCustomer>,
        summaries: &[SalespersonSummary],
    ) -> Self {
        let (count, value, churn) = dormant.into_iter().fold((0usize, 0.0, 0.0), |(n, v, c), d| {
            (n + 1, v + d.total_6_month_value, c + d.churn_risk_score)
        });
        Self {
            reference_date: window.reference_date,
            window_start: window.window_start,
            recency_threshold: window.recency_threshold,
            customers_in_window,
            dormant_customer_count: count,
            total_value_at_risk: value,
            average_churn_risk: ratio(churn, count as f64),
            high_value_dormant_count: summaries.iter().map(|s| s.high_value_dormant_count).sum(),
            quick_win_count: summaries.iter().map(|s| s.quick_win_count).sum(),
            salesperson_count: summaries.len(),
            potential_recovery: summaries.iter().map(|s| s.potential_recovery).sum(),
        }
    }
}

/// Full report from the in-memory pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    pub request_id: String,
    pub summary: ReportSummary,
    /// Ordered by value at risk, highest first.
    pub salesperson_summaries: Vec<SalespersonSummary>,
    /// Ordered by 6-month value, highest first.
    pub dormant_customers: Vec<EnhancedCustomerData>,
    pub insights: BTreeMap<String, String>,
    pub rep_performance: RepPerformance,
    pub data_quality: DataQualityReport,
    pub revenue_forecast: RevenueForecast,
    pub segment_counts: BTreeMap<String, usize>,
    pub geographic_distribution: BTreeMap<String, GeographicSummary>,
    pub product_insights: ProductInsights,
}

/// Report from the streaming pipeline: no per-customer enrichment, so no
/// win-back, segments, forecast or product insights.
#[derive(Clone, Debug, Serialize)]
pub struct BasicReport {
    pub request_id: String,
    pub summary: ReportSummary,
    pub salesperson_summaries: Vec<SalespersonSummary>,
    pub rep_performance: RepPerformance,
    pub dormant_customers: Vec<DormantCustomer>,
    pub geographic_distribution: BTreeMap<String, GeographicSummary>,
    pub data_quality: DataQualityReport,
}
