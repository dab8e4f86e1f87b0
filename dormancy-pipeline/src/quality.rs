//! Data quality accounting.
//!
//! Row-level problems are counted here instead of failing the run. Only the
//! first `max_reported_issues` messages are kept; the counters always cover
//! every row.

use serde::Serialize;

use crate::util::ratio;

/// Weights of the overall accuracy score.
const COMPLETENESS_WEIGHT: f64 = 0.4;
const VALIDITY_WEIGHT: f64 = 0.3;
const MAPPING_WEIGHT: f64 = 0.3;

#[derive(Clone, Debug, Default, Serialize)]
pub struct DataQualityReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_dates: usize,
    pub missing_customer_names: usize,
    pub invalid_prices: usize,
    /// `None` when the run did not check for duplicates (streaming
    /// reports keep no row history to compare against).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_records: Option<usize>,
    /// Rows dated after a configured reference date.
    pub future_dated_records: usize,
    pub customers_analyzed: usize,
    /// Customers with no entry on the assignment sheet.
    pub missing_customer_mappings: usize,
    /// valid / total rows.
    pub record_completeness: f64,
    /// Share of valid rows with a parseable price.
    pub price_completeness: f64,
    /// Share of valid rows carrying a state or province.
    pub location_completeness: f64,
    /// Share of customers found on the assignment sheet.
    pub assignment_coverage: f64,
    pub data_accuracy_score: f64,
    pub issue_count: usize,
    pub issues: Vec<String>,
}

/// Running counters filled by the aggregator.
#[derive(Clone, Debug)]
pub struct QualityTracker {
    max_issues: usize,
    total: usize,
    invalid_dates: usize,
    missing_customers: usize,
    invalid_prices: usize,
    duplicates: Option<usize>,
    future_dated: usize,
    located: usize,
    issue_count: usize,
    issues: Vec<String>,
}

impl QualityTracker {
    pub fn new(max_issues: usize) -> Self {
        Self {
            max_issues,
            total: 0,
            invalid_dates: 0,
            missing_customers: 0,
            invalid_prices: 0,
            duplicates: Some(0),
            future_dated: 0,
            located: 0,
            issue_count: 0,
            issues: Vec::new(),
        }
    }

    /// Report duplicates as unchecked instead of zero.
    pub fn without_duplicate_check(mut self) -> Self {
        self.duplicates = None;
        self
    }

    pub fn row_seen(&mut self) {
        self.total += 1;
    }

    pub fn invalid_date(&mut self, line: usize, raw_customer: &str) {
        self.invalid_dates += 1;
        self.issue(format!("Line {}: unparseable date for '{}'", line, raw_customer));
    }

    pub fn missing_customer(&mut self, line: usize) {
        self.missing_customers += 1;
        self.issue(format!("Line {}: missing customer name", line));
    }

    pub fn invalid_price(&mut self, line: usize, customer: &str) {
        self.invalid_prices += 1;
        self.issue(format!(
            "Line {}: unparseable net price for '{}', counted as 0",
            line, customer
        ));
    }

    pub fn duplicate(&mut self, line: usize, customer: &str) {
        *self.duplicates.get_or_insert(0) += 1;
        self.issue(format!("Line {}: duplicate of an earlier row for '{}'", line, customer));
    }

    pub fn future_dated(&mut self, line: usize, customer: &str) {
        self.future_dated += 1;
        self.issue(format!(
            "Line {}: '{}' dated after the reference date, ignored",
            line, customer
        ));
    }

    pub fn located(&mut self) {
        self.located += 1;
    }

    /// Rows rejected outright (bad date or no customer).
    pub fn invalid_rows(&self) -> usize {
        self.invalid_dates + self.missing_customers
    }

    pub fn total_rows(&self) -> usize {
        self.total
    }

    fn issue(&mut self, message: String) {
        self.issue_count += 1;
        if self.issues.len() < self.max_issues {
            self.issues.push(message);
        }
    }

    /// Close the books once customer-level counts are known.
    pub fn finish(self, customers_analyzed: usize, unmapped_customers: usize) -> DataQualityReport {
        let valid = self.total - self.invalid_rows() - self.future_dated;
        let record_completeness = ratio(valid as f64, self.total as f64);
        let validity =
            1.0 - ratio((self.invalid_dates + self.invalid_prices) as f64, self.total as f64);
        let assignment_coverage = if customers_analyzed == 0 {
            0.0
        } else {
            1.0 - ratio(unmapped_customers as f64, customers_analyzed as f64)
        };
        let accuracy = if self.total == 0 {
            0.0
        } else {
            (record_completeness * COMPLETENESS_WEIGHT
                + validity * VALIDITY_WEIGHT
                + assignment_coverage * MAPPING_WEIGHT)
                .clamp(0.0, 1.0)
        };

        DataQualityReport {
            total_records: self.total,
            valid_records: valid,
            invalid_dates: self.invalid_dates,
            missing_customer_names: self.missing_customers,
            invalid_prices: self.invalid_prices,
            duplicate_records: self.duplicates,
            future_dated_records: self.future_dated,
            customers_analyzed,
            missing_customer_mappings: unmapped_customers,
            record_completeness,
            price_completeness: 1.0 - ratio(self.invalid_prices as f64, valid as f64),
            location_completeness: ratio(self.located as f64, valid as f64),
            assignment_coverage,
            data_accuracy_score: accuracy,
            issue_count: self.issue_count,
            issues: self.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_data_scores_full_marks() {
        let mut tracker = QualityTracker::new(10);
        for _ in 0..4 {
            tracker.row_seen();
            tracker.located();
        }
        let report = tracker.finish(2, 0);
        assert_eq!(report.valid_records, 4);
        assert!((report.record_completeness - 1.0).abs() < 1e-9);
        assert!((report.location_completeness - 1.0).abs() < 1e-9);
        assert!((report.data_accuracy_score - 1.0).abs() < 1e-9);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn issues_are_capped_but_counted() {
        let mut tracker = QualityTracker::new(3);
        for line in 0..12 {
            tracker.row_seen();
            tracker.missing_customer(line + 2);
        }
        let report = tracker.finish(0, 0);
        assert_eq!(report.issue_count, 12);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.missing_customer_names, 12);
        assert_eq!(report.valid_records, 0);
        assert_eq!(report.price_completeness, 1.0);
    }

    #[test]
    fn accuracy_blends_completeness_validity_and_mapping() {
        let mut tracker = QualityTracker::new(10);
        for _ in 0..10 {
            tracker.row_seen();
        }
        tracker.invalid_date(3, "Club A");
        tracker.invalid_price(4, "Club B");
        // 9/10 complete, 8/10 valid, 1 of 4 customers unmapped.
        let report = tracker.finish(4, 1);
        let expected = 0.9 * 0.4 + 0.8 * 0.3 + 0.75 * 0.3;
        assert!((report.data_accuracy_score - expected).abs() < 1e-9);
    }

    #[test]
    fn unchecked_duplicates_are_left_out() {
        let mut tracker = QualityTracker::new(10).without_duplicate_check();
        tracker.row_seen();
        let report = tracker.finish(1, 0);
        assert_eq!(report.duplicate_records, None);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("duplicate_records"));

        let checked = QualityTracker::new(10).finish(0, 0);
        assert_eq!(checked.duplicate_records, Some(0));
    }

    #[test]
    fn empty_input_scores_zero() {
        let report = QualityTracker::new(10).finish(0, 0);
        assert_eq!(report.data_accuracy_score, 0.0);
        assert_eq!(report.record_completeness, 0.0);
    }
}
