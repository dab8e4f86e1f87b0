use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Shipping location attached to a sales line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.state.is_empty() && self.postal_code.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.city.as_str(), self.state.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        write!(f, "{}", parts.join(", "))?;
        if !self.postal_code.is_empty() {
            if !parts.is_empty() {
                write!(f, " ")?;
            }
            write!(f, "{}", self.postal_code)?;
        }
        Ok(())
    }
}

/// One sales line from the transaction export.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransactionRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    /// `None` when the date cell could not be parsed.
    pub date: Option<NaiveDate>,
    pub customer: String,
    /// Salesperson of record on the transaction itself.
    pub salesperson: String,
    pub product: String,
    pub quantity: f64,
    pub net_price: f64,
    /// False when the price cell was unparseable (the price is then 0).
    pub price_valid: bool,
    pub location: Location,
}

/// One row of the customer-to-salesperson assignment sheet.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AssignmentRecord {
    pub customer: String,
    pub salesperson: String,
    /// Optional numeric target columns, keyed by header.
    pub targets: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Running per-customer record built during the aggregation pass.
#[derive(Clone, Debug, Serialize)]
pub struct CustomerAggregate {
    pub customer: String,
    pub salesperson: String,
    pub last_order_date: NaiveDate,
    pub total_6_month_value: f64,
    pub order_count_6_months: u32,
    /// Distinct products, capped by `AnalysisConfig::max_aggregate_products`.
    pub products: BTreeSet<String>,
    pub location: Location,
    /// Populated by `finalize`.
    pub days_since_order: i64,
    /// Populated by `finalize`.
    pub average_order_value: f64,
    pub first_order_date: NaiveDate,
    pub lifetime_order_count: u32,
    pub lifetime_value: f64,
}

/// Coarse calendar season of a customer's last order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "Winter buyer"),
            Season::Spring => write!(f, "Spring buyer"),
            Season::Summer => write!(f, "Summer buyer"),
            Season::Fall => write!(f, "Fall buyer"),
        }
    }
}

/// A customer who ordered inside the lookback window but not recently.
#[derive(Clone, Debug, Serialize)]
pub struct DormantCustomer {
    pub customer: String,
    pub salesperson: String,
    pub last_order_date: NaiveDate,
    pub days_since_order: i64,
    pub total_6_month_value: f64,
    pub order_count_6_months: u32,
    pub average_order_value: f64,
    pub products: Vec<String>,
    pub location: Location,
    pub churn_risk_score: f64,
    pub seasonal_label: Season,
    pub lifetime_value: f64,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Direction of ordering cadence: are gaps between orders shrinking?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Increasing => write!(f, "\u{2191} increasing"),
            Trend::Stable => write!(f, "\u{2192} stable"),
            Trend::Decreasing => write!(f, "\u{2193} decreasing"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    InsufficientData,
    Sporadic,
    Holiday,
    Spring,
    Summer,
    Fall,
    SelectiveMonths,
    YearRound,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeasonalPattern {
    pub kind: PatternKind,
    pub label: String,
    pub confidence: f64,
    /// Calendar months (1-12), ascending.
    pub peak_months: Vec<u32>,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductPreference {
    pub product: String,
    pub order_frequency: u32,
    pub total_value: f64,
    pub last_ordered: NaiveDate,
    pub trend: Trend,
}

/// The five normalized inputs of the win-back score.
#[derive(Clone, Debug, Serialize)]
pub struct WinBackFactors {
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
    pub seasonal: f64,
    pub product_diversity: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct WinBackProbability {
    pub score: f64,
    pub factors: WinBackFactors,
    pub recommendation: String,
    /// Six months of revenue at the customer's historical run-rate.
    pub estimated_revenue: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SegmentKind {
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "At-Risk")]
    AtRisk,
    Regular,
    Occasional,
    Lost,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 5] = [
        SegmentKind::Vip,
        SegmentKind::AtRisk,
        SegmentKind::Regular,
        SegmentKind::Occasional,
        SegmentKind::Lost,
    ];
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Vip => write!(f, "VIP"),
            SegmentKind::AtRisk => write!(f, "At-Risk"),
            SegmentKind::Regular => write!(f, "Regular"),
            SegmentKind::Occasional => write!(f, "Occasional"),
            SegmentKind::Lost => write!(f, "Lost"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CustomerSegment {
    pub segment: SegmentKind,
    pub criteria: String,
    pub rationale: String,
    pub action_plan: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderHistory {
    pub first_order_date: NaiveDate,
    pub total_orders: u32,
    pub total_lifetime_value: f64,
    pub average_days_between_orders: f64,
    pub trend: Trend,
}

/// A dormant customer with every enrichment attached.
#[derive(Clone, Debug, Serialize)]
pub struct EnhancedCustomerData {
    #[serde(flatten)]
    pub customer: DormantCustomer,
    pub seasonal_pattern: SeasonalPattern,
    pub product_preferences: Vec<ProductPreference>,
    pub win_back: WinBackProbability,
    pub segment: CustomerSegment,
    pub order_history: OrderHistory,
    /// Outreach notes for the salesperson, most urgent first.
    pub talking_points: Vec<String>,
}

// ---------------------------------------------------------------------------
// Roll-ups
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SalespersonSummary {
    pub salesperson: String,
    pub dormant_customer_count: usize,
    pub total_value_at_risk: f64,
    pub high_value_dormant_count: usize,
    pub quick_win_count: usize,
    pub average_churn_risk: f64,
    /// Zero in streaming reports, which skip win-back scoring.
    pub average_win_back_score: f64,
    pub potential_recovery: f64,
    pub top_products: Vec<ProductRevenue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_joins_present_parts() {
        let loc = Location {
            city: "Napa".into(),
            state: "CA".into(),
            postal_code: "94558".into(),
        };
        assert_eq!(loc.to_string(), "Napa, CA 94558");

        let state_only = Location {
            state: "OR".into(),
            ..Location::default()
        };
        assert_eq!(state_only.to_string(), "OR");
        assert_eq!(Location::default().to_string(), "");
    }

    #[test]
    fn season_from_month_buckets() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(7), Season::Summer);
        assert_eq!(Season::from_month(10), Season::Fall);
        assert_eq!(Season::Fall.to_string(), "Fall buyer");
    }

    #[test]
    fn segment_labels_serialize_with_display_names() {
        assert_eq!(serde_json::to_string(&SegmentKind::Vip).unwrap(), "\"VIP\"");
        assert_eq!(serde_json::to_string(&SegmentKind::AtRisk).unwrap(), "\"At-Risk\"");
        assert_eq!(SegmentKind::AtRisk.to_string(), "At-Risk");
    }

    #[test]
    fn trend_display_and_serialization_differ() {
        assert_eq!(Trend::Decreasing.to_string(), "\u{2193} decreasing");
        assert_eq!(serde_json::to_string(&Trend::Decreasing).unwrap(), "\"decreasing\"");
    }
}
