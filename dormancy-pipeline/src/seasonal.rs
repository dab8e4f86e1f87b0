//! Seasonal buying-pattern detection over a customer's full order history.
//!
//! Orders are bucketed by calendar month across all years. A month is a
//! peak when it holds more than `PEAK_MONTH_FACTOR` times the mean monthly
//! count. One to three peaks that mostly fall inside a named season adopt
//! that season's label; scattered peaks are reported as selective months.

use chrono::{Datelike, NaiveDate};

use crate::thresholds::{
    MAX_CLUSTERED_PEAKS, MIN_ORDERS_FOR_PATTERN, MIN_SEASON_OVERLAP, PEAK_MONTH_FACTOR,
};
use crate::types::{PatternKind, SeasonalPattern};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Named seasons in match priority order. Holiday shares November with
/// Fall and wins ties.
const NAMED_SEASONS: [(PatternKind, &str, [u32; 3]); 4] = [
    (PatternKind::Holiday, "Holiday", [11, 12, 1]),
    (PatternKind::Spring, "Spring", [3, 4, 5]),
    (PatternKind::Summer, "Summer", [6, 7, 8]),
    (PatternKind::Fall, "Fall", [9, 10, 11]),
];

const SPORADIC_CONFIDENCE: f64 = 0.3;
const SELECTIVE_CONFIDENCE: f64 = 0.7;
const YEAR_ROUND_CONFIDENCE: f64 = 0.5;
const SEASON_BASE_CONFIDENCE: f64 = 0.6;
const SEASON_CONFIDENCE_PER_MATCH: f64 = 0.15;
const SEASON_MAX_CONFIDENCE: f64 = 0.9;

pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Detect the buying pattern of one customer from their order dates.
pub fn detect(order_dates: &[NaiveDate]) -> SeasonalPattern {
    let total = order_dates.len();
    if total < MIN_ORDERS_FOR_PATTERN {
        return SeasonalPattern {
            kind: PatternKind::InsufficientData,
            label: "Insufficient data".into(),
            confidence: 0.0,
            peak_months: Vec::new(),
            description: format!(
                "Only {} order(s) on record; at least {} are needed to infer a pattern",
                total, MIN_ORDERS_FOR_PATTERN
            ),
        };
    }

    let mut counts = [0usize; 12];
    for date in order_dates {
        counts[date.month0() as usize] += 1;
    }
    let mean = total as f64 / 12.0;
    let peak_months: Vec<u32> = counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count as f64 > PEAK_MONTH_FACTOR * mean)
        .map(|(idx, _)| idx as u32 + 1)
        .collect();

    if peak_months.is_empty() {
        return SeasonalPattern {
            kind: PatternKind::Sporadic,
            label: "Sporadic buyer".into(),
            confidence: SPORADIC_CONFIDENCE,
            peak_months,
            description: "Orders are spread without a clear monthly peak".into(),
        };
    }

    if peak_months.len() <= MAX_CLUSTERED_PEAKS {
        for (kind, name, months) in NAMED_SEASONS.iter() {
            let overlap = peak_months.iter().filter(|m| months.contains(*m)).count();
            if overlap >= MIN_SEASON_OVERLAP {
                let confidence = (SEASON_BASE_CONFIDENCE
                    + SEASON_CONFIDENCE_PER_MATCH * overlap as f64)
                    .min(SEASON_MAX_CONFIDENCE);
                let description = format!(
                    "Orders concentrate in {} ({})",
                    name,
                    join_months(&peak_months)
                );
                return SeasonalPattern {
                    kind: *kind,
                    label: format!("{} buyer", name),
                    confidence,
                    peak_months,
                    description,
                };
            }
        }

        let named = join_months(&peak_months);
        return SeasonalPattern {
            kind: PatternKind::SelectiveMonths,
            label: format!("Selective months ({})", named),
            confidence: SELECTIVE_CONFIDENCE,
            description: format!("Orders peak in {} without a seasonal cluster", named),
            peak_months,
        };
    }

    SeasonalPattern {
        kind: PatternKind::YearRound,
        label: "Year-round buyer".into(),
        confidence: YEAR_ROUND_CONFIDENCE,
        description: format!("Orders peak in {} different months", peak_months.len()),
        peak_months,
    }
}

fn join_months(months: &[u32]) -> String {
    months
        .iter()
        .map(|m| month_abbreviation(*m))
        .collect::<Vec<_>>()
        .join(", ")
}
