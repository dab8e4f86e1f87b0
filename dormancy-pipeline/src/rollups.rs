//! Roll-ups over the dormant customer list.
//!
//! Each roll-up is a fold from the customer list into a fresh map; nothing
//! is mutated in place across stages.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::thresholds::{PRODUCT_INSIGHT_LIMIT, SALESPERSON_TOP_PRODUCTS};
use crate::types::{
    DormantCustomer, EnhancedCustomerData, ProductRevenue, SalespersonSummary, SegmentKind, Trend,
};
use crate::util::{finite_or_zero, ratio};

/// State or province used when a customer has none on file.
pub const UNKNOWN_REGION: &str = "Unknown";

// ---------------------------------------------------------------------------
// Salesperson
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SalespersonTally {
    count: usize,
    value: f64,
    high_value: usize,
    quick_wins: usize,
    churn_sum: f64,
    win_back_sum: f64,
    recovery: f64,
    products: BTreeMap<String, f64>,
}

impl SalespersonTally {
    fn add_customer(&mut self, customer: &DormantCustomer, config: &AnalysisConfig) {
        self.count += 1;
        self.value += customer.total_6_month_value;
        self.churn_sum += customer.churn_risk_score;
        if customer.total_6_month_value > config.high_value_threshold {
            self.high_value += 1;
        }
    }

    fn into_summary(self, salesperson: String) -> SalespersonSummary {
        let mut products: Vec<ProductRevenue> = self
            .products
            .into_iter()
            .map(|(product, revenue)| ProductRevenue { product, revenue })
            .collect();
        products.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| a.product.cmp(&b.product))
        });
        products.truncate(SALESPERSON_TOP_PRODUCTS);

        let count = self.count as f64;
        SalespersonSummary {
            salesperson,
            dormant_customer_count: self.count,
            total_value_at_risk: self.value,
            high_value_dormant_count: self.high_value,
            quick_win_count: self.quick_wins,
            average_churn_risk: ratio(self.churn_sum, count),
            average_win_back_score: ratio(self.win_back_sum, count),
            potential_recovery: self.recovery,
            top_products: products,
        }
    }
}

/// One summary per salesperson, keyed order (by name).
pub fn salesperson_summaries(
    customers: &[EnhancedCustomerData],
    config: &AnalysisConfig,
) -> Vec<SalespersonSummary> {
    let tallies = customers.iter().fold(
        BTreeMap::<String, SalespersonTally>::new(),
        |mut acc, enhanced| {
            let tally = acc
                .entry(enhanced.customer.salesperson.clone())
                .or_default();
            tally.add_customer(&enhanced.customer, config);

            let win_back = enhanced.win_back.score;
            tally.win_back_sum += win_back;
            if win_back > config.quick_win_threshold {
                tally.quick_wins += 1;
            }
            tally.recovery += finite_or_zero(enhanced.win_back.estimated_revenue * win_back);
            for pref in &enhanced.product_preferences {
                *tally.products.entry(pref.product.clone()).or_insert(0.0) += pref.total_value;
            }
            acc
        },
    );
    tallies
        .into_iter()
        .map(|(name, tally)| tally.into_summary(name))
        .collect()
}

/// Salesperson summaries without win-back fields, for the streaming report.
pub fn basic_salesperson_summaries<'a>(
    customers: impl IntoIterator<Item = &'a DormantCustomer>,
    config: &AnalysisConfig,
) -> Vec<SalespersonSummary> {
    let tallies = customers.into_iter().fold(
        BTreeMap::<String, SalespersonTally>::new(),
        |mut acc, customer| {
            acc.entry(customer.salesperson.clone())
                .or_default()
                .add_customer(customer, config);
            acc
        },
    );
    tallies
        .into_iter()
        .map(|(name, tally)| tally.into_summary(name))
        .collect()
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct ProductInsight {
    pub product: String,
    pub customer_count: usize,
    pub total_revenue: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ProductInsights {
    /// Wine products by revenue across dormant customers.
    pub top_products: Vec<ProductInsight>,
    /// Products some dormant customer was ordering more often.
    pub trending_up: Vec<String>,
    /// Products some dormant customer was ordering less often.
    pub trending_down: Vec<String>,
}

pub fn product_insights(
    customers: &[EnhancedCustomerData],
    config: &AnalysisConfig,
) -> ProductInsights {
    let mut totals: BTreeMap<&str, (BTreeSet<&str>, f64)> = BTreeMap::new();
    let mut trending_up = BTreeSet::new();
    let mut trending_down = BTreeSet::new();

    for enhanced in customers {
        for pref in &enhanced.product_preferences {
            if !config.is_wine_product(&pref.product) {
                continue;
            }
            let entry = totals.entry(pref.product.as_str()).or_default();
            entry.0.insert(enhanced.customer.customer.as_str());
            entry.1 += pref.total_value;
            match pref.trend {
                Trend::Increasing => {
                    trending_up.insert(pref.product.clone());
                }
                Trend::Decreasing => {
                    trending_down.insert(pref.product.clone());
                }
                Trend::Stable => {}
            }
        }
    }

    let mut top_products: Vec<ProductInsight> = totals
        .into_iter()
        .map(|(product, (buyers, revenue))| ProductInsight {
            product: product.to_string(),
            customer_count: buyers.len(),
            total_revenue: revenue,
        })
        .collect();
    top_products.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.product.cmp(&b.product))
    });
    top_products.truncate(PRODUCT_INSIGHT_LIMIT);

    ProductInsights {
        top_products,
        trending_up: trending_up.into_iter().collect(),
        trending_down: trending_down.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Geography and segments
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GeographicSummary {
    pub customer_count: usize,
    pub total_value: f64,
}

/// Dormant customers and value grouped by state or province.
pub fn geographic_distribution<'a>(
    customers: impl IntoIterator<Item = &'a DormantCustomer>,
) -> BTreeMap<String, GeographicSummary> {
    customers
        .into_iter()
        .fold(BTreeMap::new(), |mut acc, customer| {
            let state = customer.location.state.trim();
            let key = if state.is_empty() { UNKNOWN_REGION } else { state };
            let entry: &mut GeographicSummary = acc.entry(key.to_string()).or_default();
            entry.customer_count += 1;
            entry.total_value += customer.total_6_month_value;
            acc
        })
}

/// Customers per segment label. Every segment is listed, empty ones at 0.
pub fn segment_counts(customers: &[EnhancedCustomerData]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = SegmentKind::ALL
        .iter()
        .map(|kind| (kind.to_string(), 0))
        .collect();
    for enhanced in customers {
        *counts
            .entry(enhanced.segment.segment.to_string())
            .or_insert(0) += 1;
    }
    counts
}
