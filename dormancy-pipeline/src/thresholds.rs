//! Centralized scoring weights and tiers.
//!
//! Tunable business thresholds (dormancy window, high-value and quick-win
//! cut-offs) live in [`crate::config::AnalysisConfig`]; the defaults below
//! seed that struct. Weights and saturation points are fixed: changing one
//! shifts every score in a report, so they are not exposed as config.

// ---------------------------------------------------------------------------
// Defaults for AnalysisConfig
// ---------------------------------------------------------------------------

/// Customers who ordered within this many days are still active.
pub const DORMANT_DAYS_THRESHOLD: i64 = 45;

/// Upper bound accepted for `dormant_days_threshold` (about 100 years).
pub const MAX_DORMANT_DAYS_THRESHOLD: i64 = 36_500;

/// Length of the trailing lookback window in calendar months.
pub const LOOKBACK_MONTHS: u32 = 6;

/// 6-month value above which a dormant customer counts as high value.
pub const HIGH_VALUE_THRESHOLD: f64 = 2_000.0;

/// Win-back score above which a dormant customer is a quick win.
pub const QUICK_WIN_THRESHOLD: f64 = 0.7;

/// Cap on the product set kept on the simple per-customer aggregate.
pub const MAX_AGGREGATE_PRODUCTS: usize = 10;

/// Number of row-level issues surfaced in the data quality report.
pub const MAX_REPORTED_ISSUES: usize = 10;

/// Rows per chunk for the streaming variant.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

// ---------------------------------------------------------------------------
// Churn risk
// ---------------------------------------------------------------------------

pub const CHURN_RECENCY_WEIGHT: f64 = 0.5;
pub const CHURN_FREQUENCY_WEIGHT: f64 = 0.3;
pub const CHURN_VALUE_WEIGHT: f64 = 0.2;
/// Days since last order at which the recency term saturates.
pub const CHURN_RECENCY_SATURATION_DAYS: f64 = 180.0;
/// 6-month order count at which the frequency term reaches zero risk.
pub const CHURN_FREQUENCY_SATURATION_ORDERS: f64 = 12.0;
pub const CHURN_LOW_VALUE_LIMIT: f64 = 1_000.0;
pub const CHURN_HIGH_VALUE_LIMIT: f64 = 5_000.0;
pub const CHURN_LOW_VALUE_RISK: f64 = 0.8;
pub const CHURN_MID_VALUE_RISK: f64 = 0.5;
pub const CHURN_HIGH_VALUE_RISK: f64 = 0.2;

// ---------------------------------------------------------------------------
// Win-back probability
// ---------------------------------------------------------------------------

pub const WIN_BACK_RECENCY_WEIGHT: f64 = 0.3;
pub const WIN_BACK_FREQUENCY_WEIGHT: f64 = 0.25;
pub const WIN_BACK_MONETARY_WEIGHT: f64 = 0.25;
pub const WIN_BACK_SEASONAL_WEIGHT: f64 = 0.1;
pub const WIN_BACK_DIVERSITY_WEIGHT: f64 = 0.1;
pub const WIN_BACK_RECENCY_HORIZON_DAYS: f64 = 365.0;
/// Orders per month at which the frequency factor saturates.
pub const WIN_BACK_FREQUENCY_SATURATION: f64 = 2.0;
pub const WIN_BACK_MONETARY_SATURATION: f64 = 10_000.0;
pub const WIN_BACK_DIVERSITY_SATURATION: f64 = 10.0;
pub const WIN_BACK_IN_SEASON: f64 = 0.9;
pub const WIN_BACK_OFF_SEASON: f64 = 0.5;
/// Forward months used for the recoverable revenue projection.
pub const RECOVERY_HORIZON_MONTHS: f64 = 6.0;
/// Average days per month used to turn date spans into months.
pub const DAYS_PER_MONTH: f64 = 30.0;

// ---------------------------------------------------------------------------
// Seasonal patterns and trends
// ---------------------------------------------------------------------------

pub const MIN_ORDERS_FOR_PATTERN: usize = 3;
/// A month is a peak when its count exceeds this multiple of the mean.
pub const PEAK_MONTH_FACTOR: f64 = 1.5;
pub const MAX_CLUSTERED_PEAKS: usize = 3;
/// Peak months that must fall inside a named season to adopt its label.
pub const MIN_SEASON_OVERLAP: usize = 2;
pub const TREND_INCREASING_RATIO: f64 = 0.8;
pub const TREND_DECREASING_RATIO: f64 = 1.2;

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

pub const VIP_MIN_VALUE: f64 = 5_000.0;
pub const VIP_MIN_ORDERS: u32 = 4;
pub const VIP_FREQUENT_ORDERS: u32 = 8;
pub const VIP_FREQUENT_MIN_AOV: f64 = 500.0;
pub const AT_RISK_MIN_VALUE: f64 = 2_000.0;
pub const AT_RISK_MIN_ORDERS: u32 = 4;
pub const AT_RISK_MIN_CHURN: f64 = 0.7;
pub const REGULAR_MIN_ORDERS: u32 = 3;
pub const REGULAR_MIN_WIN_BACK: f64 = 0.5;
pub const REGULAR_ALT_MIN_VALUE: f64 = 1_500.0;
pub const REGULAR_ALT_MIN_ORDERS: u32 = 2;
pub const OCCASIONAL_MIN_WIN_BACK: f64 = 0.3;

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

pub const OPTIMISTIC_MULTIPLIER: f64 = 1.2;
pub const CONSERVATIVE_MULTIPLIER: f64 = 0.7;
/// Share of realistic recovery landing in each forward month.
pub const RECOVERY_TIMELINE_WEIGHTS: [f64; 6] = [0.35, 0.25, 0.20, 0.12, 0.05, 0.03];

// ---------------------------------------------------------------------------
// Roll-ups
// ---------------------------------------------------------------------------

/// Products kept per salesperson summary.
pub const SALESPERSON_TOP_PRODUCTS: usize = 5;
/// Products listed in the product insight block.
pub const PRODUCT_INSIGHT_LIMIT: usize = 10;
/// Products shown per customer in the CSV export.
pub const EXPORT_TOP_PRODUCTS: usize = 3;

// ---------------------------------------------------------------------------
// Talking points and rep performance
// ---------------------------------------------------------------------------

/// Churn risk above which outreach is flagged as high priority.
pub const TALKING_POINT_HIGH_CHURN: f64 = 0.7;
/// 6-month value above which a special offer or visit is suggested.
pub const TALKING_POINT_HIGH_VALUE: f64 = 1_000.0;
/// Past products mentioned per customer.
pub const TALKING_POINT_PRODUCTS: usize = 3;
/// Average churn risk above which a salesperson needs attention.
pub const REP_ATTENTION_CHURN: f64 = 0.7;
pub const REP_ATTENTION_LIMIT: usize = 3;
