//! Revenue recovery forecast.
//!
//! Each customer's estimated recoverable revenue is discounted by their
//! win-back score under three scenarios. The realistic total is then
//! spread over the months after the reference date, front-loaded because
//! outreach that works tends to work early.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::thresholds::{CONSERVATIVE_MULTIPLIER, OPTIMISTIC_MULTIPLIER, RECOVERY_TIMELINE_WEIGHTS};
use crate::types::EnhancedCustomerData;
use crate::util::finite_or_zero;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScenarioTotals {
    pub optimistic: f64,
    pub realistic: f64,
    pub conservative: f64,
}

impl ScenarioTotals {
    /// Scenarios for one customer. For `win_back` in [0, 1] and a
    /// non-negative estimate, conservative <= realistic <= optimistic.
    pub fn for_customer(estimated_revenue: f64, win_back: f64) -> Self {
        let estimate = finite_or_zero(estimated_revenue).max(0.0);
        let win_back = finite_or_zero(win_back).clamp(0.0, 1.0);
        Self {
            optimistic: estimate * (win_back * OPTIMISTIC_MULTIPLIER).min(1.0),
            realistic: estimate * win_back,
            conservative: estimate * (win_back * CONSERVATIVE_MULTIPLIER).max(0.0),
        }
    }

    fn add(&mut self, other: &ScenarioTotals) {
        self.optimistic += other.optimistic;
        self.realistic += other.realistic;
        self.conservative += other.conservative;
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SegmentForecast {
    pub customer_count: usize,
    pub estimated_revenue: f64,
    pub scenarios: ScenarioTotals,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineMonth {
    /// `YYYY-MM`.
    pub month: String,
    pub projected_recovery: f64,
    pub cumulative_recovery: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RevenueForecast {
    pub scenarios: ScenarioTotals,
    pub by_segment: BTreeMap<String, SegmentForecast>,
    pub timeline: Vec<TimelineMonth>,
}

pub fn forecast(customers: &[EnhancedCustomerData], reference_date: NaiveDate) -> RevenueForecast {
    let mut scenarios = ScenarioTotals::default();
    let mut by_segment: BTreeMap<String, SegmentForecast> = BTreeMap::new();

    for enhanced in customers {
        let estimate = enhanced.win_back.estimated_revenue;
        let customer_scenarios = ScenarioTotals::for_customer(estimate, enhanced.win_back.score);
        scenarios.add(&customer_scenarios);

        let segment = by_segment
            .entry(enhanced.segment.segment.to_string())
            .or_default();
        segment.customer_count += 1;
        segment.estimated_revenue += finite_or_zero(estimate);
        segment.scenarios.add(&customer_scenarios);
    }

    RevenueForecast {
        timeline: timeline(scenarios.realistic, reference_date),
        scenarios,
        by_segment,
    }
}

/// Spread `total` over the months following `reference_date`.
pub fn timeline(total: f64, reference_date: NaiveDate) -> Vec<TimelineMonth> {
    let month_start = reference_date.with_day(1).unwrap_or(reference_date);
    let mut cumulative = 0.0;
    RECOVERY_TIMELINE_WEIGHTS
        .iter()
        .enumerate()
        .map(|(offset, weight)| {
            let projected = total * weight;
            cumulative += projected;
            let month = month_start
                .checked_add_months(Months::new(offset as u32 + 1))
                .map(|d| d.format("%Y-%m").to_string())
                .unwrap_or_default();
            TimelineMonth {
                month,
                projected_recovery: projected,
                cumulative_recovery: cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dormant, enhanced};
    use crate::types::SegmentKind;

    #[test]
    fn scenario_multipliers() {
        let s = ScenarioTotals::for_customer(1_000.0, 0.5);
        assert!((s.optimistic - 600.0).abs() < 1e-9);
        assert!((s.realistic - 500.0).abs() < 1e-9);
        assert!((s.conservative - 350.0).abs() < 1e-9);

        let capped = ScenarioTotals::for_customer(1_000.0, 0.9);
        assert!((capped.optimistic - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn scenarios_are_ordered() {
        for step in 0..=20 {
            let wb = step as f64 / 20.0;
            let s = ScenarioTotals::for_customer(750.0, wb);
            assert!(s.conservative <= s.realistic && s.realistic <= s.optimistic);
        }
        let junk = ScenarioTotals::for_customer(f64::NAN, 0.5);
        assert_eq!(junk, ScenarioTotals::default());
    }

    #[test]
    fn timeline_starts_next_month_and_sums_to_total() {
        let reference = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        let months = timeline(1_000.0, reference);
        assert_eq!(months.len(), 6);
        assert_eq!(months[0].month, "2025-12");
        assert_eq!(months[1].month, "2026-01");
        assert!((months[0].projected_recovery - 350.0).abs() < 1e-9);
        assert!((months[5].cumulative_recovery - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn forecast_breaks_down_by_segment() {
        let customers = vec![
            enhanced(dormant("A", "Rep1", 100.0, "CA"), 0.5, 1_000.0, SegmentKind::Regular),
            enhanced(dormant("B", "Rep1", 100.0, "CA"), 0.25, 400.0, SegmentKind::Regular),
            enhanced(dormant("C", "Rep2", 100.0, "CA"), 0.1, 200.0, SegmentKind::Lost),
        ];
        let reference = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let f = forecast(&customers, reference);
        assert!((f.scenarios.realistic - (500.0 + 100.0 + 20.0)).abs() < 1e-9);
        assert_eq!(f.by_segment["Regular"].customer_count, 2);
        assert!((f.by_segment["Regular"].estimated_revenue - 1_400.0).abs() < 1e-9);
        assert!((f.by_segment["Lost"].scenarios.realistic - 20.0).abs() < 1e-9);
        assert_eq!(f.timeline[0].month, "2025-07");
    }
}
