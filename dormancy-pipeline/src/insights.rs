//! Plain-language priority statements derived from the report aggregates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::forecast::RevenueForecast;
use crate::rollups::GeographicSummary;
use crate::types::{EnhancedCustomerData, PatternKind, SalespersonSummary, SegmentKind};
use crate::thresholds::{
    REP_ATTENTION_CHURN, REP_ATTENTION_LIMIT, TALKING_POINT_HIGH_CHURN, TALKING_POINT_HIGH_VALUE,
    TALKING_POINT_PRODUCTS,
};
use crate::util::{format_dollars, ratio};

pub const TOP_PRIORITY_SALESPERSON: &str = "top_priority_salesperson";
pub const TOP_PRIORITY_CUSTOMER: &str = "top_priority_customer";
pub const QUICK_WINS: &str = "quick_wins";
pub const VIP_ALERT: &str = "vip_alert";
pub const REVENUE_OPPORTUNITY: &str = "revenue_opportunity";
pub const TOP_GEOGRAPHY: &str = "top_geography";
pub const SEASONAL_INSIGHT: &str = "seasonal_insight";

/// Inputs the insight statements are built from.
pub struct InsightInputs<'a> {
    pub summaries: &'a [SalespersonSummary],
    pub customers: &'a [EnhancedCustomerData],
    pub forecast: &'a RevenueForecast,
    pub geography: &'a BTreeMap<String, GeographicSummary>,
    pub config: &'a AnalysisConfig,
}

/// Every key is always present; empty inputs get a fallback sentence.
pub fn generate(inputs: &InsightInputs<'_>) -> BTreeMap<String, String> {
    let mut insights = BTreeMap::new();
    insights.insert(TOP_PRIORITY_SALESPERSON.to_string(), top_salesperson(inputs.summaries));
    insights.insert(TOP_PRIORITY_CUSTOMER.to_string(), top_customer(inputs.customers));
    insights.insert(QUICK_WINS.to_string(), quick_wins(inputs.customers, inputs.config));
    insights.insert(VIP_ALERT.to_string(), vip_alert(inputs.customers));
    insights.insert(REVENUE_OPPORTUNITY.to_string(), revenue_opportunity(inputs.forecast));
    insights.insert(TOP_GEOGRAPHY.to_string(), top_geography(inputs.geography));
    insights.insert(SEASONAL_INSIGHT.to_string(), seasonal_insight(inputs.customers));
    insights
}

fn top_salesperson(summaries: &[SalespersonSummary]) -> String {
    let top = summaries.iter().reduce(|best, s| {
        if s.total_value_at_risk > best.total_value_at_risk {
            s
        } else {
            best
        }
    });
    match top {
        Some(s) => format!(
            "{} has {} dormant customer(s) with {} at risk",
            s.salesperson,
            s.dormant_customer_count,
            format_dollars(s.total_value_at_risk)
        ),
        None => "No salesperson has dormant customers".into(),
    }
}

fn top_customer(customers: &[EnhancedCustomerData]) -> String {
    let top = customers.iter().map(|e| &e.customer).reduce(|best, c| {
        if c.total_6_month_value > best.total_6_month_value {
            c
        } else {
            best
        }
    });
    match top {
        Some(c) => format!(
            "{} ({} in the last 6 months, last order {} days ago) - contact via {}",
            c.customer,
            format_dollars(c.total_6_month_value),
            c.days_since_order,
            c.salesperson
        ),
        None => "No dormant customers".into(),
    }
}

fn quick_wins(customers: &[EnhancedCustomerData], config: &AnalysisConfig) -> String {
    let (count, value) = customers
        .iter()
        .filter(|e| e.win_back.score > config.quick_win_threshold)
        .fold((0usize, 0.0), |(n, v), e| (n + 1, v + e.customer.total_6_month_value));
    if count == 0 {
        format!(
            "No customers above {:.0}% win-back probability",
            config.quick_win_threshold * 100.0
        )
    } else {
        format!(
            "{} customer(s) above {:.0}% win-back probability, worth {}",
            count,
            config.quick_win_threshold * 100.0,
            format_dollars(value)
        )
    }
}

fn vip_alert(customers: &[EnhancedCustomerData]) -> String {
    let (count, value) = customers
        .iter()
        .filter(|e| e.segment.segment == SegmentKind::Vip)
        .fold((0usize, 0.0), |(n, v), e| (n + 1, v + e.customer.total_6_month_value));
    if count == 0 {
        "No VIP customers are dormant".into()
    } else {
        format!(
            "{} VIP customer(s) dormant with {} at risk - call within 48 hours",
            count,
            format_dollars(value)
        )
    }
}

fn revenue_opportunity(forecast: &RevenueForecast) -> String {
    let s = &forecast.scenarios;
    format!(
        "Realistic recovery of {} over the next 6 months (range {} to {})",
        format_dollars(s.realistic),
        format_dollars(s.conservative),
        format_dollars(s.optimistic)
    )
}

fn top_geography(geography: &BTreeMap<String, GeographicSummary>) -> String {
    let top = geography.iter().reduce(|best, entry| {
        if entry.1.total_value > best.1.total_value {
            entry
        } else {
            best
        }
    });
    match top {
        Some((region, summary)) => format!(
            "{} has the most value at risk: {} across {} customer(s)",
            region,
            format_dollars(summary.total_value),
            summary.customer_count
        ),
        None => "No geographic data available".into(),
    }
}

fn seasonal_insight(customers: &[EnhancedCustomerData]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for enhanced in customers {
        let pattern = &enhanced.seasonal_pattern;
        if matches!(pattern.kind, PatternKind::InsufficientData) {
            continue;
        }
        let label = match pattern.kind {
            // Month lists differ per customer; group them under one label.
            PatternKind::SelectiveMonths => "Selective months",
            _ => pattern.label.as_str(),
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    let top = counts
        .into_iter()
        .reduce(|best, entry| if entry.1 > best.1 { entry } else { best });
    match top {
        Some((label, count)) => format!(
            "Most common buying pattern: {} ({} customer(s)) - time outreach to their peak months",
            label, count
        ),
        None => "Not enough order history to detect seasonal patterns".into(),
    }
}

/// Outreach notes for one customer, most urgent first. Empty when nothing
/// stands out.
pub fn talking_points(enhanced: &EnhancedCustomerData) -> Vec<String> {
    let customer = &enhanced.customer;
    let mut points = Vec::new();
    if customer.churn_risk_score > TALKING_POINT_HIGH_CHURN {
        points.push("HIGH PRIORITY: immediate outreach recommended due to high churn risk".into());
    }
    if !enhanced.product_preferences.is_empty() {
        let products: Vec<&str> = enhanced
            .product_preferences
            .iter()
            .take(TALKING_POINT_PRODUCTS)
            .map(|p| p.product.as_str())
            .collect();
        points.push(format!(
            "Mention products they previously enjoyed: {}",
            products.join(", ")
        ));
    }
    if !matches!(
        enhanced.seasonal_pattern.kind,
        PatternKind::InsufficientData | PatternKind::Sporadic
    ) {
        points.push(format!(
            "Time the call around their {} pattern",
            enhanced.seasonal_pattern.label
        ));
    }
    if customer.total_6_month_value > TALKING_POINT_HIGH_VALUE {
        points.push("High-value customer: consider a special offer or a personal visit".into());
    }
    points
}

/// Team-level view over the salesperson summaries.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepPerformance {
    pub total_value_at_risk: f64,
    pub average_dormant_customers_per_rep: f64,
    /// Salesperson with the most value at risk.
    pub top_salesperson: Option<String>,
    /// Salespeople whose dormant book averages high churn risk, in summary
    /// order.
    pub needs_attention: Vec<String>,
}

/// `summaries` must already be ordered by value at risk, highest first.
pub fn rep_performance(summaries: &[SalespersonSummary]) -> RepPerformance {
    let dormant: usize = summaries.iter().map(|s| s.dormant_customer_count).sum();
    RepPerformance {
        total_value_at_risk: summaries.iter().map(|s| s.total_value_at_risk).sum(),
        average_dormant_customers_per_rep: ratio(dormant as f64, summaries.len() as f64),
        top_salesperson: summaries.first().map(|s| s.salesperson.clone()),
        needs_attention: summaries
            .iter()
            .filter(|s| s.average_churn_risk > REP_ATTENTION_CHURN)
            .take(REP_ATTENTION_LIMIT)
            .map(|s| s.salesperson.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dormant, enhanced, preference};
    use crate::types::Trend;
    use crate::types::SeasonalPattern;

    fn with_pattern(mut e: EnhancedCustomerData, kind: PatternKind, label: &str) -> EnhancedCustomerData {
        e.seasonal_pattern = SeasonalPattern {
            kind,
            label: label.into(),
            confidence: 0.8,
            peak_months: vec![11, 12],
            description: String::new(),
        };
        e
    }

    #[test]
    fn every_key_present_on_empty_input() {
        let config = AnalysisConfig::default();
        let forecast = RevenueForecast::default();
        let geography = BTreeMap::new();
        let insights = generate(&InsightInputs {
            summaries: &[],
            customers: &[],
            forecast: &forecast,
            geography: &geography,
            config: &config,
        });
        for key in [
            TOP_PRIORITY_SALESPERSON,
            TOP_PRIORITY_CUSTOMER,
            QUICK_WINS,
            VIP_ALERT,
            REVENUE_OPPORTUNITY,
            TOP_GEOGRAPHY,
            SEASONAL_INSIGHT,
        ] {
            assert!(insights.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn statements_reference_top_entities() {
        let config = AnalysisConfig::default();
        let customers = vec![
            with_pattern(
                enhanced(dormant("Club B", "Rep2", 2_250.0, "OR"), 0.75, 500.0, SegmentKind::Regular),
                PatternKind::Holiday,
                "Holiday buyer",
            ),
            with_pattern(
                enhanced(dormant("Club A", "Rep1", 3_105.5, "CA"), 0.5, 800.0, SegmentKind::Vip),
                PatternKind::Holiday,
                "Holiday buyer",
            ),
        ];
        let summaries = crate::rollups::salesperson_summaries(&customers, &config);
        let geography = crate::rollups::geographic_distribution(customers.iter().map(|e| &e.customer));
        let forecast = crate::forecast::forecast(
            &customers,
            chrono::NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        let insights = generate(&InsightInputs {
            summaries: &summaries,
            customers: &customers,
            forecast: &forecast,
            geography: &geography,
            config: &config,
        });

        assert!(insights[TOP_PRIORITY_CUSTOMER].starts_with("Club A"));
        assert!(insights[TOP_PRIORITY_SALESPERSON].starts_with("Rep1"));
        assert!(insights[QUICK_WINS].starts_with("1 customer"));
        assert!(insights[VIP_ALERT].contains("$3,105.50"));
        assert!(insights[TOP_GEOGRAPHY].starts_with("CA"));
        assert!(insights[SEASONAL_INSIGHT].contains("Holiday buyer (2 customer(s))"));
    }

    #[test]
    fn talking_points_cover_churn_products_timing_and_value() {
        let mut customer = dormant("Club A", "Rep1", 3_105.5, "CA");
        customer.churn_risk_score = 0.8;
        let mut e = with_pattern(
            enhanced(customer, 0.5, 800.0, SegmentKind::Vip),
            PatternKind::Holiday,
            "Holiday buyer",
        );
        e.product_preferences = vec![
            preference("Cabernet", 900.0, Trend::Stable),
            preference("Merlot", 600.0, Trend::Stable),
            preference("Pinot Noir", 300.0, Trend::Stable),
            preference("Rose", 100.0, Trend::Stable),
        ];

        let points = talking_points(&e);
        assert_eq!(points.len(), 4);
        assert!(points[0].starts_with("HIGH PRIORITY"));
        assert_eq!(
            points[1],
            "Mention products they previously enjoyed: Cabernet, Merlot, Pinot Noir"
        );
        assert_eq!(points[2], "Time the call around their Holiday buyer pattern");
        assert!(points[3].starts_with("High-value customer"));
    }

    #[test]
    fn quiet_low_value_customer_has_no_talking_points() {
        let mut customer = dormant("Corner Shop", "Rep1", 400.0, "CA");
        customer.churn_risk_score = 0.7;
        let e = with_pattern(
            enhanced(customer, 0.2, 50.0, SegmentKind::Occasional),
            PatternKind::Sporadic,
            "Sporadic buyer",
        );
        assert!(talking_points(&e).is_empty());
    }

    #[test]
    fn rep_performance_flags_high_churn_books() {
        let summary = |name: &str, count: usize, value: f64, churn: f64| SalespersonSummary {
            salesperson: name.into(),
            dormant_customer_count: count,
            total_value_at_risk: value,
            average_churn_risk: churn,
            ..SalespersonSummary::default()
        };
        let summaries = vec![
            summary("Rep1", 3, 9_000.0, 0.75),
            summary("Rep2", 1, 5_000.0, 0.4),
            summary("Rep3", 2, 2_000.0, 0.9),
            summary("Rep4", 1, 1_000.0, 0.71),
            summary("Rep5", 1, 500.0, 0.95),
        ];

        let perf = rep_performance(&summaries);
        assert!((perf.total_value_at_risk - 17_500.0).abs() < 1e-9);
        assert!((perf.average_dormant_customers_per_rep - 1.6).abs() < 1e-9);
        assert_eq!(perf.top_salesperson.as_deref(), Some("Rep1"));
        assert_eq!(perf.needs_attention, vec!["Rep1", "Rep3", "Rep4"]);
    }

    #[test]
    fn rep_performance_is_empty_without_summaries() {
        assert_eq!(rep_performance(&[]), RepPerformance::default());
    }
}
