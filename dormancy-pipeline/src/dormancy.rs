//! Dormancy classification and churn-risk scoring.

use chrono::Datelike;

use crate::thresholds::*;
use crate::types::{CustomerAggregate, DormantCustomer, Season};

/// Churn risk in [0, 1] from recency, order frequency and 6-month value.
pub fn churn_risk(days_since_order: i64, order_count: u32, total_value: f64) -> f64 {
    let recency = (days_since_order as f64 / CHURN_RECENCY_SATURATION_DAYS).clamp(0.0, 1.0);
    let frequency =
        1.0 - (order_count as f64 / CHURN_FREQUENCY_SATURATION_ORDERS).clamp(0.0, 1.0);
    let value = value_tier_risk(total_value);
    (CHURN_RECENCY_WEIGHT * recency + CHURN_FREQUENCY_WEIGHT * frequency + CHURN_VALUE_WEIGHT * value)
        .clamp(0.0, 1.0)
}

/// Small accounts churn more readily than large ones.
pub fn value_tier_risk(total_value: f64) -> f64 {
    if total_value < CHURN_LOW_VALUE_LIMIT {
        CHURN_LOW_VALUE_RISK
    } else if total_value <= CHURN_HIGH_VALUE_LIMIT {
        CHURN_MID_VALUE_RISK
    } else {
        CHURN_HIGH_VALUE_RISK
    }
}

/// Average order value projected over `max(2n, 6)` orders, never below
/// what the customer has already spent.
pub fn estimate_lifetime_value(aggregate: &CustomerAggregate) -> f64 {
    let projected_orders = (2 * aggregate.order_count_6_months).max(6) as f64;
    let projected = aggregate.average_order_value * projected_orders;
    let estimate = projected
        .max(aggregate.total_6_month_value)
        .max(aggregate.lifetime_value);
    if estimate.is_finite() {
        estimate
    } else {
        aggregate.total_6_month_value
    }
}

/// Build the dormant record for an aggregate already known to be dormant.
pub fn score(aggregate: CustomerAggregate) -> DormantCustomer {
    let churn_risk_score = churn_risk(
        aggregate.days_since_order,
        aggregate.order_count_6_months,
        aggregate.total_6_month_value,
    );
    let lifetime_value = estimate_lifetime_value(&aggregate);
    let seasonal_label = Season::from_month(aggregate.last_order_date.month());

    DormantCustomer {
        customer: aggregate.customer,
        salesperson: aggregate.salesperson,
        last_order_date: aggregate.last_order_date,
        days_since_order: aggregate.days_since_order,
        total_6_month_value: aggregate.total_6_month_value,
        order_count_6_months: aggregate.order_count_6_months,
        average_order_value: aggregate.average_order_value,
        products: aggregate.products.into_iter().collect(),
        location: aggregate.location,
        churn_risk_score,
        seasonal_label,
        lifetime_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn aggregate(last: NaiveDate, days: i64, orders: u32, value: f64) -> CustomerAggregate {
        CustomerAggregate {
            customer: "Club A".into(),
            salesperson: "Rep1".into(),
            last_order_date: last,
            total_6_month_value: value,
            order_count_6_months: orders,
            products: BTreeSet::from(["Merlot".to_string()]),
            location: Location::default(),
            days_since_order: days,
            average_order_value: if orders > 0 { value / orders as f64 } else { 0.0 },
            first_order_date: last,
            lifetime_order_count: orders,
            lifetime_value: value,
        }
    }

    #[test]
    fn churn_risk_matches_weighted_terms() {
        // recency 90/180 = 0.5, frequency 1 - 3/12 = 0.75, value tier 0.5
        let risk = churn_risk(90, 3, 2_250.0);
        assert!((risk - (0.25 + 0.225 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn churn_risk_saturates() {
        let risk = churn_risk(400, 0, 10.0);
        assert!((risk - (0.5 + 0.3 + 0.16)).abs() < 1e-9);
        let low = churn_risk(0, 50, 50_000.0);
        assert!((low - 0.04).abs() < 1e-9);
    }

    #[test]
    fn value_tiers_boundaries() {
        assert_eq!(value_tier_risk(999.99), 0.8);
        assert_eq!(value_tier_risk(1_000.0), 0.5);
        assert_eq!(value_tier_risk(5_000.0), 0.5);
        assert_eq!(value_tier_risk(5_000.01), 0.2);
    }

    #[test]
    fn lifetime_value_never_below_six_month_value() {
        let agg = aggregate(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), 60, 5, 3_105.5);
        let ltv = estimate_lifetime_value(&agg);
        // 621.10 * max(10, 6)
        assert!((ltv - 6_211.0).abs() < 1e-6);

        let mut seasoned = agg.clone();
        seasoned.lifetime_value = 50_000.0;
        assert!((estimate_lifetime_value(&seasoned) - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn score_carries_aggregate_fields() {
        let last = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        let dormant = score(aggregate(last, 46, 2, 500.0));
        assert_eq!(dormant.seasonal_label, Season::Spring);
        assert!(dormant.churn_risk_score > 0.0 && dormant.churn_risk_score <= 1.0);
        assert_eq!(dormant.products, vec!["Merlot".to_string()]);
    }
}
