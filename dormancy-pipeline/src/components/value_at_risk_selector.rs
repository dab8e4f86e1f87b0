use crate::query::AnalysisQuery;
use crate::selector::Selector;
use crate::types::{DormantCustomer, EnhancedCustomerData, SalespersonSummary};

/// Anything ranked by the revenue it puts at risk.
pub trait ValueAtRisk {
    fn value_at_risk(&self) -> f64;
}

impl ValueAtRisk for DormantCustomer {
    fn value_at_risk(&self) -> f64 {
        self.total_6_month_value
    }
}

impl ValueAtRisk for EnhancedCustomerData {
    fn value_at_risk(&self) -> f64 {
        self.customer.total_6_month_value
    }
}

impl ValueAtRisk for SalespersonSummary {
    fn value_at_risk(&self) -> f64 {
        self.total_value_at_risk
    }
}

/// Orders customers or salesperson summaries by value at risk, highest
/// first. Report lists are never truncated; `limit` is for display.
#[derive(Default)]
pub struct ValueAtRiskSelector {
    pub limit: Option<usize>,
}

impl<C> Selector<AnalysisQuery, C> for ValueAtRiskSelector
where
    C: ValueAtRisk,
{
    fn score(&self, candidate: &C) -> f64 {
        candidate.value_at_risk()
    }

    fn size(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::query::AnalysisWindow;
    use crate::test_support::dormant;
    use chrono::NaiveDate;

    fn query() -> AnalysisQuery {
        let config = AnalysisConfig::default();
        let reference = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        AnalysisQuery::new("req", AnalysisWindow::new(reference, &config).unwrap(), config)
    }

    #[test]
    fn sorts_descending_with_nan_last() {
        let customers = vec![
            dormant("low", "Rep1", 10.0, ""),
            dormant("nan", "Rep1", f64::NAN, ""),
            dormant("high", "Rep1", 900.0, ""),
            dormant("mid", "Rep1", 300.0, ""),
        ];
        let selected = ValueAtRiskSelector::default().select(&query(), customers);
        let names: Vec<&str> = selected.iter().map(|c| c.customer.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low", "nan"]);
    }

    #[test]
    fn limit_truncates() {
        let customers = vec![
            dormant("a", "Rep1", 1.0, ""),
            dormant("b", "Rep1", 2.0, ""),
            dormant("c", "Rep1", 3.0, ""),
        ];
        let selector = ValueAtRiskSelector { limit: Some(2) };
        let selected = selector.select(&query(), customers);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].customer, "c");
    }
}
