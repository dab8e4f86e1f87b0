//! Lifetime order history summary.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::products::gap_trend;
use crate::types::{OrderHistory, TransactionRecord};
use crate::util::ratio;

/// Summarize a customer's full history. Gaps are measured between
/// distinct order dates, so several lines on one invoice count once.
///
/// Returns `None` for an empty or undated history.
pub fn summarize(history: &[TransactionRecord]) -> Option<OrderHistory> {
    let dates: BTreeSet<NaiveDate> = history.iter().filter_map(|r| r.date).collect();
    let first_order_date = *dates.iter().next()?;
    let last_order_date = *dates.iter().next_back()?;

    let distinct: Vec<NaiveDate> = dates.into_iter().collect();
    let average_days_between_orders = ratio(
        (last_order_date - first_order_date).num_days() as f64,
        (distinct.len() - 1) as f64,
    );

    Some(OrderHistory {
        first_order_date,
        total_orders: history.iter().filter(|r| r.date.is_some()).count() as u32,
        total_lifetime_value: history.iter().map(|r| r.net_price).sum(),
        average_days_between_orders,
        trend: gap_trend(&distinct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Trend};

    fn line(y: i32, m: u32, d: u32, price: f64) -> TransactionRecord {
        TransactionRecord {
            line: 0,
            date: NaiveDate::from_ymd_opt(y, m, d),
            customer: "Club A".into(),
            salesperson: String::new(),
            product: "Merlot".into(),
            quantity: 1.0,
            net_price: price,
            price_valid: true,
            location: Location::default(),
        }
    }

    #[test]
    fn summary_over_distinct_dates() {
        let history = vec![
            line(2025, 1, 1, 100.0),
            line(2025, 1, 1, 50.0),
            line(2025, 1, 31, 100.0),
            line(2025, 3, 2, 100.0),
        ];
        let summary = summarize(&history).unwrap();
        assert_eq!(summary.total_orders, 4);
        assert!((summary.total_lifetime_value - 350.0).abs() < 1e-9);
        assert_eq!(summary.first_order_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        // 60 days over two gaps.
        assert!((summary.average_days_between_orders - 30.0).abs() < 1e-9);
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn single_date_has_zero_gap() {
        let summary = summarize(&[line(2025, 1, 1, 10.0)]).unwrap();
        assert_eq!(summary.average_days_between_orders, 0.0);
        assert!(summarize(&[]).is_none());
    }
}
