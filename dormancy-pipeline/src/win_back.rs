//! Win-back probability: a weighted heuristic over five normalized factors.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::thresholds::*;
use crate::types::{
    DormantCustomer, SeasonalPattern, TransactionRecord, WinBackFactors, WinBackProbability,
};
use crate::util::{finite_or_zero, ratio};

const IMMEDIATE_OUTREACH_SCORE: f64 = 0.7;
const TARGETED_CAMPAIGN_SCORE: f64 = 0.5;
const NURTURE_SCORE: f64 = 0.3;

/// Orders per month over the span from first to last order. Spans
/// shorter than a month count as one month.
pub fn orders_per_month(history: &[TransactionRecord]) -> f64 {
    let dates = history.iter().filter_map(|r| r.date);
    let (first, last) = dates.fold((None::<NaiveDate>, None::<NaiveDate>), |(lo, hi), d| {
        (
            Some(lo.map_or(d, |l| l.min(d))),
            Some(hi.map_or(d, |h| h.max(d))),
        )
    });
    let (Some(first), Some(last)) = (first, last) else {
        return 0.0;
    };
    let orders = history.iter().filter(|r| r.date.is_some()).count() as f64;
    let months = ((last - first).num_days() as f64 / DAYS_PER_MONTH).max(1.0);
    ratio(orders, months)
}

pub fn recommendation(score: f64) -> &'static str {
    if score > IMMEDIATE_OUTREACH_SCORE {
        "High probability: immediate personal outreach from the assigned salesperson"
    } else if score > TARGETED_CAMPAIGN_SCORE {
        "Good probability: targeted campaign featuring previously purchased products"
    } else if score > NURTURE_SCORE {
        "Moderate probability: enroll in a nurture email sequence"
    } else {
        "Low probability: monitor and include in general marketing"
    }
}

/// Score one dormant customer against their full history.
///
/// `reference_date` is the analysis "today"; the seasonal factor is high
/// when its month is one of the customer's peak months.
pub fn score(
    customer: &DormantCustomer,
    history: &[TransactionRecord],
    pattern: &SeasonalPattern,
    reference_date: NaiveDate,
) -> WinBackProbability {
    let per_month = orders_per_month(history);
    let distinct_products = history
        .iter()
        .map(|r| r.product.trim())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .len();

    let factors = WinBackFactors {
        recency: (1.0 - customer.days_since_order as f64 / WIN_BACK_RECENCY_HORIZON_DAYS)
            .clamp(0.0, 1.0),
        frequency: (per_month / WIN_BACK_FREQUENCY_SATURATION).clamp(0.0, 1.0),
        monetary: (customer.total_6_month_value / WIN_BACK_MONETARY_SATURATION).clamp(0.0, 1.0),
        seasonal: if pattern.peak_months.contains(&reference_date.month()) {
            WIN_BACK_IN_SEASON
        } else {
            WIN_BACK_OFF_SEASON
        },
        product_diversity: (distinct_products as f64 / WIN_BACK_DIVERSITY_SATURATION)
            .clamp(0.0, 1.0),
    };

    let score = finite_or_zero(
        WIN_BACK_RECENCY_WEIGHT * factors.recency
            + WIN_BACK_FREQUENCY_WEIGHT * factors.frequency
            + WIN_BACK_MONETARY_WEIGHT * factors.monetary
            + WIN_BACK_SEASONAL_WEIGHT * factors.seasonal
            + WIN_BACK_DIVERSITY_WEIGHT * factors.product_diversity,
    )
    .clamp(0.0, 1.0);

    let estimated_revenue =
        finite_or_zero(customer.average_order_value * per_month * RECOVERY_HORIZON_MONTHS).max(0.0);

    WinBackProbability {
        score,
        factors,
        recommendation: recommendation(score).to_string(),
        estimated_revenue,
    }
}
