//! Outreach segments. Gates are checked in priority order and the first
//! match wins, so every dormant customer lands in exactly one segment.

use crate::thresholds::*;
use crate::types::{CustomerSegment, DormantCustomer, SegmentKind};

impl SegmentKind {
    pub fn criteria(&self) -> &'static str {
        match self {
            SegmentKind::Vip => {
                "6-month value over $5,000 with 4+ orders, or 8+ orders averaging over $500"
            }
            SegmentKind::AtRisk => {
                "6-month value over $2,000 or 4+ orders, with churn risk above 70%"
            }
            SegmentKind::Regular => {
                "3+ orders with win-back above 50%, or value over $1,500 with 2+ orders"
            }
            SegmentKind::Occasional => "At least one order with win-back above 30%",
            SegmentKind::Lost => "Low engagement and low win-back probability",
        }
    }

    pub fn action_plan(&self) -> &'static str {
        match self {
            SegmentKind::Vip => {
                "Personal call from the salesperson within 48 hours with an exclusive offer"
            }
            SegmentKind::AtRisk => {
                "Priority outreach this week; review past orders and address service issues"
            }
            SegmentKind::Regular => {
                "Targeted email featuring favorite products, follow up with a call"
            }
            SegmentKind::Occasional => "Add to seasonal campaign and new-release announcements",
            SegmentKind::Lost => "Include in general marketing; re-evaluate next quarter",
        }
    }
}

/// Which gate does this customer pass first?
pub fn classify(customer: &DormantCustomer, win_back_score: f64) -> SegmentKind {
    let value = customer.total_6_month_value;
    let orders = customer.order_count_6_months;

    if (value > VIP_MIN_VALUE && orders >= VIP_MIN_ORDERS)
        || (orders >= VIP_FREQUENT_ORDERS && customer.average_order_value > VIP_FREQUENT_MIN_AOV)
    {
        SegmentKind::Vip
    } else if (value > AT_RISK_MIN_VALUE || orders >= AT_RISK_MIN_ORDERS)
        && customer.churn_risk_score > AT_RISK_MIN_CHURN
    {
        SegmentKind::AtRisk
    } else if (orders >= REGULAR_MIN_ORDERS && win_back_score > REGULAR_MIN_WIN_BACK)
        || (value > REGULAR_ALT_MIN_VALUE && orders >= REGULAR_ALT_MIN_ORDERS)
    {
        SegmentKind::Regular
    } else if orders >= 1 && win_back_score > OCCASIONAL_MIN_WIN_BACK {
        SegmentKind::Occasional
    } else {
        SegmentKind::Lost
    }
}

/// Segment a customer and explain the placement.
pub fn segment(
    customer: &DormantCustomer,
    win_back_score: f64,
    lifetime_orders: u32,
) -> CustomerSegment {
    let kind = classify(customer, win_back_score);
    let rationale = format!(
        "${:.2} over {} orders in 6 months ({} lifetime), churn risk {:.0}%, win-back {:.0}%",
        customer.total_6_month_value,
        customer.order_count_6_months,
        lifetime_orders,
        customer.churn_risk_score * 100.0,
        win_back_score * 100.0
    );
    CustomerSegment {
        segment: kind,
        criteria: kind.criteria().to_string(),
        rationale,
        action_plan: kind.action_plan().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Season};
    use chrono::NaiveDate;

    fn customer(value: f64, orders: u32, churn: f64) -> DormantCustomer {
        DormantCustomer {
            customer: "Club".into(),
            salesperson: "Rep".into(),
            last_order_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            days_since_order: 60,
            total_6_month_value: value,
            order_count_6_months: orders,
            average_order_value: if orders > 0 { value / orders as f64 } else { 0.0 },
            products: Vec::new(),
            location: Location::default(),
            churn_risk_score: churn,
            seasonal_label: Season::Spring,
            lifetime_value: value,
        }
    }

    #[test]
    fn vip_gates() {
        assert_eq!(classify(&customer(5_001.0, 4, 0.9), 0.0), SegmentKind::Vip);
        assert_eq!(classify(&customer(4_400.0, 8, 0.9), 0.0), SegmentKind::Vip);
        // 8 orders at exactly $500 is not VIP.
        assert_ne!(classify(&customer(4_000.0, 8, 0.1), 0.0), SegmentKind::Vip);
    }

    #[test]
    fn at_risk_needs_high_churn() {
        assert_eq!(classify(&customer(2_500.0, 2, 0.71), 0.9), SegmentKind::AtRisk);
        assert_eq!(classify(&customer(500.0, 4, 0.75), 0.9), SegmentKind::AtRisk);
        assert_ne!(classify(&customer(2_500.0, 2, 0.7), 0.9), SegmentKind::AtRisk);
    }

    #[test]
    fn regular_and_occasional() {
        assert_eq!(classify(&customer(900.0, 3, 0.5), 0.51), SegmentKind::Regular);
        assert_eq!(classify(&customer(1_600.0, 2, 0.5), 0.0), SegmentKind::Regular);
        assert_eq!(classify(&customer(900.0, 3, 0.5), 0.5), SegmentKind::Occasional);
        assert_eq!(classify(&customer(100.0, 1, 0.5), 0.31), SegmentKind::Occasional);
        assert_eq!(classify(&customer(100.0, 1, 0.5), 0.3), SegmentKind::Lost);
    }

    #[test]
    fn segment_carries_fixed_texts() {
        let seg = segment(&customer(100.0, 1, 0.5), 0.1, 7);
        assert_eq!(seg.segment, SegmentKind::Lost);
        assert_eq!(seg.criteria, SegmentKind::Lost.criteria());
        assert_eq!(seg.action_plan, SegmentKind::Lost.action_plan());
        assert!(seg.rationale.contains("7 lifetime"));
    }
}
