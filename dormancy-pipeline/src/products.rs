//! Product preferences per customer.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::AnalysisConfig;
use crate::thresholds::{TREND_DECREASING_RATIO, TREND_INCREASING_RATIO};
use crate::types::{ProductPreference, TransactionRecord, Trend};

/// Compare the average gap between orders in the first and second half of
/// a date series. Shrinking gaps mean the customer orders more often.
///
/// Fewer than three dates carry no trend and come back `Stable`.
pub fn gap_trend(dates: &[NaiveDate]) -> Trend {
    if dates.len() < 3 {
        return Trend::Stable;
    }
    let mut sorted = dates.to_vec();
    sorted.sort();
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days() as f64)
        .collect();

    let mid = gaps.len() / 2;
    let first = mean(&gaps[..mid]);
    let second = mean(&gaps[mid..]);
    if first <= 0.0 {
        // Same-day bursts at the start give no baseline to compare with.
        return Trend::Stable;
    }
    let ratio = second / first;
    if ratio < TREND_INCREASING_RATIO {
        Trend::Increasing
    } else if ratio > TREND_DECREASING_RATIO {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

struct ProductTally {
    orders: u32,
    value: f64,
    dates: Vec<NaiveDate>,
}

/// One preference per merchandise product, highest total value first.
pub fn analyze(history: &[TransactionRecord], config: &AnalysisConfig) -> Vec<ProductPreference> {
    let mut tallies: BTreeMap<&str, ProductTally> = BTreeMap::new();
    for record in history {
        let product = record.product.trim();
        if !config.is_merchandise(product) {
            continue;
        }
        let tally = tallies.entry(product).or_insert_with(|| ProductTally {
            orders: 0,
            value: 0.0,
            dates: Vec::new(),
        });
        tally.orders += 1;
        tally.value += record.net_price;
        if let Some(date) = record.date {
            tally.dates.push(date);
        }
    }

    let mut preferences: Vec<ProductPreference> = tallies
        .into_iter()
        .filter_map(|(product, tally)| {
            let last_ordered = tally.dates.iter().max().copied()?;
            Some(ProductPreference {
                product: product.to_string(),
                order_frequency: tally.orders,
                total_value: tally.value,
                last_ordered,
                trend: gap_trend(&tally.dates),
            })
        })
        .collect();

    preferences.sort_by(|a, b| {
        b.total_value
            .total_cmp(&a.total_value)
            .then_with(|| a.product.cmp(&b.product))
    });
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(product: &str, d: NaiveDate, price: f64) -> TransactionRecord {
        TransactionRecord {
            line: 0,
            date: Some(d),
            customer: "Club A".into(),
            salesperson: String::new(),
            product: product.into(),
            quantity: 1.0,
            net_price: price,
            price_valid: true,
            location: Location::default(),
        }
    }

    #[test]
    fn gap_trend_directions() {
        let shrinking = [date(2024, 1, 1), date(2024, 3, 1), date(2024, 3, 15)];
        assert_eq!(gap_trend(&shrinking), Trend::Increasing);

        let growing = [date(2024, 1, 1), date(2024, 1, 10), date(2024, 4, 1)];
        assert_eq!(gap_trend(&growing), Trend::Decreasing);

        let steady = [date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 3)];
        assert_eq!(gap_trend(&steady), Trend::Stable);

        assert_eq!(gap_trend(&[date(2024, 1, 1), date(2024, 6, 1)]), Trend::Stable);
    }

    #[test]
    fn gap_trend_sorts_input() {
        let unordered = [date(2024, 3, 15), date(2024, 1, 1), date(2024, 3, 1)];
        assert_eq!(gap_trend(&unordered), Trend::Increasing);
    }

    #[test]
    fn preferences_sorted_and_filtered() {
        let history = vec![
            line("Merlot", date(2025, 1, 1), 100.0),
            line("Merlot", date(2025, 2, 1), 100.0),
            line("Cabernet", date(2025, 1, 5), 200.0),
            line("Pinot Noir", date(2025, 1, 6), 150.0),
            line("Shipping Fee", date(2025, 1, 1), 30.0),
            line("Unknown", date(2025, 1, 1), 30.0),
            line("", date(2025, 1, 1), 30.0),
        ];
        let prefs = analyze(&history, &AnalysisConfig::default());
        let names: Vec<&str> = prefs.iter().map(|p| p.product.as_str()).collect();
        // Cabernet and Merlot tie at $200 and fall back to name order.
        assert_eq!(names, vec!["Cabernet", "Merlot", "Pinot Noir"]);
        assert_eq!(prefs[1].order_frequency, 2);
        assert_eq!(prefs[1].last_ordered, date(2025, 2, 1));
        assert_eq!(prefs[1].trend, Trend::Stable);
    }
}
