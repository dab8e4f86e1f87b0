//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::types::*;

pub fn dormant(name: &str, salesperson: &str, value: f64, state: &str) -> DormantCustomer {
    DormantCustomer {
        customer: name.into(),
        salesperson: salesperson.into(),
        last_order_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        days_since_order: 60,
        total_6_month_value: value,
        order_count_6_months: 2,
        average_order_value: value / 2.0,
        products: vec!["Merlot".into()],
        location: Location {
            state: state.into(),
            ..Location::default()
        },
        churn_risk_score: 0.5,
        seasonal_label: Season::Spring,
        lifetime_value: value,
    }
}

pub fn enhanced(
    customer: DormantCustomer,
    win_back: f64,
    estimated_revenue: f64,
    segment: SegmentKind,
) -> EnhancedCustomerData {
    EnhancedCustomerData {
        seasonal_pattern: SeasonalPattern {
            kind: PatternKind::InsufficientData,
            label: "Insufficient data".into(),
            confidence: 0.0,
            peak_months: Vec::new(),
            description: String::new(),
        },
        product_preferences: Vec::new(),
        win_back: WinBackProbability {
            score: win_back,
            factors: WinBackFactors {
                recency: 0.5,
                frequency: 0.5,
                monetary: 0.5,
                seasonal: 0.5,
                product_diversity: 0.5,
            },
            recommendation: String::new(),
            estimated_revenue,
        },
        segment: CustomerSegment {
            segment,
            criteria: segment.criteria().into(),
            rationale: String::new(),
            action_plan: segment.action_plan().into(),
        },
        order_history: OrderHistory {
            first_order_date: customer.last_order_date,
            total_orders: customer.order_count_6_months,
            total_lifetime_value: customer.total_6_month_value,
            average_days_between_orders: 0.0,
            trend: Trend::Stable,
        },
        talking_points: Vec::new(),
        customer,
    }
}

pub fn preference(product: &str, total_value: f64, trend: Trend) -> ProductPreference {
    ProductPreference {
        product: product.into(),
        order_frequency: 1,
        total_value,
        last_ordered: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        trend,
    }
}
