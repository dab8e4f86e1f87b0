//! Per-customer aggregation of transaction rows.
//!
//! The reference date has to be known before any row can be placed in or
//! out of the lookback window, so aggregation is two-phase: find the
//! reference date, then fold every row into a [`CustomerAggregator`].
//! The streaming report drives the same aggregator chunk by chunk with
//! history retention switched off.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::quality::{DataQualityReport, QualityTracker};
use crate::query::AnalysisWindow;
use crate::types::{AssignmentRecord, CustomerAggregate, Location, TransactionRecord};
use crate::util::ratio;

/// Salesperson attributed when neither the assignment sheet nor the
/// transactions name one.
pub const UNASSIGNED: &str = "Unassigned";

/// Customer to salesperson lookup built from the assignment sheet.
///
/// Keys are trimmed and lowercased so that `" Club A"` on one sheet finds
/// `"club a"` on the other.
#[derive(Clone, Debug, Default)]
pub struct AssignmentMap {
    by_customer: BTreeMap<String, String>,
}

impl AssignmentMap {
    pub fn from_records(records: &[AssignmentRecord]) -> Self {
        let by_customer = records
            .iter()
            .filter(|r| !r.salesperson.trim().is_empty())
            .map(|r| (normalize_key(&r.customer), r.salesperson.trim().to_string()))
            .collect();
        Self { by_customer }
    }

    pub fn lookup(&self, customer: &str) -> Option<&str> {
        self.by_customer
            .get(&normalize_key(customer))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_customer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_customer.is_empty()
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Everything the aggregation pass produces.
#[derive(Clone, Debug)]
pub struct AggregationOutput {
    pub window: AnalysisWindow,
    /// Customers with at least one order inside the lookback window.
    pub customers: BTreeMap<String, CustomerAggregate>,
    /// Every valid row per customer, any date up to the reference date.
    /// Empty when history retention is off.
    pub history: BTreeMap<String, Vec<TransactionRecord>>,
    pub quality: DataQualityReport,
}

/// Totals over all of a customer's valid rows, inside the window or not.
#[derive(Clone, Debug)]
struct LifetimeTotals {
    first_order_date: NaiveDate,
    order_count: u32,
    value: f64,
    /// Salesperson on the most recent row that named one.
    latest_salesperson: Option<(NaiveDate, String)>,
}

/// Folds transaction rows into per-customer aggregates.
pub struct CustomerAggregator<'a> {
    window: AnalysisWindow,
    config: &'a AnalysisConfig,
    assignments: &'a AssignmentMap,
    retain_history: bool,
    customers: BTreeMap<String, CustomerAggregate>,
    lifetime: BTreeMap<String, LifetimeTotals>,
    history: BTreeMap<String, Vec<TransactionRecord>>,
    seen_rows: HashSet<String>,
    quality: QualityTracker,
}

impl<'a> CustomerAggregator<'a> {
    pub fn new(
        window: AnalysisWindow,
        assignments: &'a AssignmentMap,
        config: &'a AnalysisConfig,
        retain_history: bool,
    ) -> Self {
        let quality = QualityTracker::new(config.max_reported_issues);
        Self {
            window,
            config,
            assignments,
            retain_history,
            customers: BTreeMap::new(),
            lifetime: BTreeMap::new(),
            history: BTreeMap::new(),
            seen_rows: HashSet::new(),
            quality: if retain_history {
                quality
            } else {
                quality.without_duplicate_check()
            },
        }
    }

    /// Fold one row. Invalid rows are counted and skipped.
    pub fn push(&mut self, record: &TransactionRecord) {
        self.quality.row_seen();

        let customer = record.customer.trim();
        if customer.is_empty() {
            self.quality.missing_customer(record.line);
            return;
        }
        let Some(date) = record.date else {
            self.quality.invalid_date(record.line, customer);
            return;
        };
        if date > self.window.reference_date {
            self.quality.future_dated(record.line, customer);
            return;
        }
        if !record.price_valid {
            self.quality.invalid_price(record.line, customer);
        }
        if !record.location.state.is_empty() {
            self.quality.located();
        }

        self.update_lifetime(customer, date, record);

        if self.retain_history {
            // Duplicate rows are reported but still counted toward revenue.
            let key = format!(
                "{}|{}|{}|{}|{}|{}",
                date,
                customer,
                record.salesperson,
                record.product,
                record.quantity,
                record.net_price
            );
            if !self.seen_rows.insert(key) {
                self.quality.duplicate(record.line, customer);
            }
            self.history
                .entry(customer.to_string())
                .or_default()
                .push(record.clone());
        }

        if self.window.in_lookback(date) {
            self.update_windowed(customer, date, record);
        }
    }

    fn update_lifetime(&mut self, customer: &str, date: NaiveDate, record: &TransactionRecord) {
        let totals = self
            .lifetime
            .entry(customer.to_string())
            .or_insert_with(|| LifetimeTotals {
                first_order_date: date,
                order_count: 0,
                value: 0.0,
                latest_salesperson: None,
            });
        totals.first_order_date = totals.first_order_date.min(date);
        totals.order_count += 1;
        totals.value += record.net_price;

        let rep = record.salesperson.trim();
        if !rep.is_empty() {
            let newer = totals
                .latest_salesperson
                .as_ref()
                .map_or(true, |(seen, _)| date >= *seen);
            if newer {
                totals.latest_salesperson = Some((date, rep.to_string()));
            }
        }
    }

    fn update_windowed(&mut self, customer: &str, date: NaiveDate, record: &TransactionRecord) {
        let max_products = self.config.max_aggregate_products;
        let aggregate = self
            .customers
            .entry(customer.to_string())
            .or_insert_with(|| CustomerAggregate {
                customer: customer.to_string(),
                salesperson: String::new(),
                last_order_date: date,
                total_6_month_value: 0.0,
                order_count_6_months: 0,
                products: BTreeSet::new(),
                location: Location::default(),
                days_since_order: 0,
                average_order_value: 0.0,
                first_order_date: date,
                lifetime_order_count: 0,
                lifetime_value: 0.0,
            });

        aggregate.total_6_month_value += record.net_price;
        aggregate.order_count_6_months += 1;

        let product = record.product.trim();
        if !product.is_empty()
            && (aggregate.products.len() < max_products || aggregate.products.contains(product))
        {
            aggregate.products.insert(product.to_string());
        }

        if date >= aggregate.last_order_date {
            aggregate.last_order_date = date;
            if !record.location.is_empty() {
                aggregate.location = record.location.clone();
            }
        } else if aggregate.location.is_empty() {
            aggregate.location = record.location.clone();
        }
    }

    /// Derive days-since-order, average order value, lifetime totals and
    /// the resolved salesperson, then close the quality report.
    pub fn finish(self) -> PipelineResult<AggregationOutput> {
        let total = self.quality.total_rows();
        if self.lifetime.is_empty() {
            return Err(PipelineError::NoValidTransactions {
                total,
                invalid: total,
            });
        }

        let unmapped = self
            .lifetime
            .keys()
            .filter(|name| self.assignments.lookup(name).is_none())
            .count();

        let mut customers = self.customers;
        for (name, aggregate) in customers.iter_mut() {
            aggregate.days_since_order = self.window.days_since(aggregate.last_order_date);
            aggregate.average_order_value = ratio(
                aggregate.total_6_month_value,
                aggregate.order_count_6_months as f64,
            );

            let totals = self.lifetime.get(name);
            if let Some(totals) = totals {
                aggregate.first_order_date = totals.first_order_date;
                aggregate.lifetime_order_count = totals.order_count;
                aggregate.lifetime_value = totals.value;
            }
            aggregate.salesperson = match self.assignments.lookup(name) {
                Some(rep) => rep.to_string(),
                None => totals
                    .and_then(|t| t.latest_salesperson.as_ref())
                    .map(|(_, rep)| rep.clone())
                    .unwrap_or_else(|| UNASSIGNED.to_string()),
            };
        }

        let quality = self.quality.finish(self.lifetime.len(), unmapped);
        let skipped = quality.total_records - quality.valid_records;
        if skipped > 0 {
            log::warn!(
                "skipped {} of {} transaction rows ({} invalid dates, {} missing customers, {} future-dated)",
                skipped,
                quality.total_records,
                quality.invalid_dates,
                quality.missing_customer_names,
                quality.future_dated_records
            );
        }
        log::debug!(
            "aggregated {} valid rows into {} customers ({} in lookback window)",
            quality.valid_records,
            self.lifetime.len(),
            customers.len()
        );

        Ok(AggregationOutput {
            window: self.window,
            customers,
            history: self.history,
            quality,
        })
    }
}

/// The configured reference date, or else the latest valid row date.
pub fn resolve_reference_date<'r>(
    records: impl IntoIterator<Item = &'r TransactionRecord>,
    config: &AnalysisConfig,
) -> PipelineResult<NaiveDate> {
    if let Some(date) = config.reference_date {
        return Ok(date);
    }
    let mut total = 0;
    let mut latest: Option<NaiveDate> = None;
    for record in records {
        total += 1;
        if record.customer.trim().is_empty() {
            continue;
        }
        if let Some(date) = record.date {
            latest = Some(latest.map_or(date, |l| l.max(date)));
        }
    }
    latest.ok_or(PipelineError::NoValidTransactions {
        total,
        invalid: total,
    })
}

/// Aggregate an in-memory table, keeping full histories.
pub fn aggregate(
    records: &[TransactionRecord],
    assignments: &AssignmentMap,
    config: &AnalysisConfig,
) -> PipelineResult<AggregationOutput> {
    let reference = resolve_reference_date(records, config)?;
    let window = AnalysisWindow::new(reference, config)?;
    let mut aggregator = CustomerAggregator::new(window, assignments, config, true);
    for record in records {
        aggregator.push(record);
    }
    aggregator.finish()
}
