use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};

/// The date range a run classifies customers against.
///
/// A customer is dormant when their last order falls in
/// `[window_start, recency_threshold)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisWindow {
    /// The analysis "today": latest transaction date unless configured.
    pub reference_date: NaiveDate,
    pub window_start: NaiveDate,
    pub recency_threshold: NaiveDate,
}

impl AnalysisWindow {
    pub fn new(reference_date: NaiveDate, config: &AnalysisConfig) -> PipelineResult<Self> {
        let window_start = reference_date
            .checked_sub_months(Months::new(config.lookback_months))
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "lookback of {} months from {} is out of range",
                    config.lookback_months, reference_date
                ))
            })?;
        let recency_threshold = Duration::try_days(config.dormant_days_threshold)
            .and_then(|days| reference_date.checked_sub_signed(days))
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!(
                    "recency threshold of {} days from {} is out of range",
                    config.dormant_days_threshold, reference_date
                ))
            })?;
        Ok(Self {
            reference_date,
            window_start,
            recency_threshold,
        })
    }

    /// Inside the trailing lookback window.
    pub fn in_lookback(&self, date: NaiveDate) -> bool {
        date >= self.window_start && date <= self.reference_date
    }

    /// Ordered inside the window but not recently.
    pub fn is_dormant(&self, last_order_date: NaiveDate) -> bool {
        last_order_date >= self.window_start && last_order_date < self.recency_threshold
    }

    pub fn days_since(&self, date: NaiveDate) -> i64 {
        (self.reference_date - date).num_days()
    }
}

/// Per-run context handed to every pipeline stage.
#[derive(Clone, Debug)]
pub struct AnalysisQuery {
    pub request_id: String,
    pub window: AnalysisWindow,
    pub config: AnalysisConfig,
}

impl AnalysisQuery {
    pub fn new(request_id: impl Into<String>, window: AnalysisWindow, config: AnalysisConfig) -> Self {
        Self {
            request_id: request_id.into(),
            window,
            config,
        }
    }
}
