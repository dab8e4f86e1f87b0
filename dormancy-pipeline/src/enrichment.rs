//! Attach seasonal, product, win-back, segment and history data to one
//! dormant customer.

use chrono::NaiveDate;

use crate::history;
use crate::insights;
use crate::products;
use crate::query::AnalysisQuery;
use crate::seasonal;
use crate::segmentation;
use crate::types::{DormantCustomer, EnhancedCustomerData, OrderHistory, TransactionRecord, Trend};
use crate::win_back;

pub fn enrich(
    customer: DormantCustomer,
    history: &[TransactionRecord],
    query: &AnalysisQuery,
) -> EnhancedCustomerData {
    let dates: Vec<NaiveDate> = history.iter().filter_map(|r| r.date).collect();
    let seasonal_pattern = seasonal::detect(&dates);
    let product_preferences = products::analyze(history, &query.config);
    let win_back = win_back::score(
        &customer,
        history,
        &seasonal_pattern,
        query.window.reference_date,
    );
    let order_history = history::summarize(history).unwrap_or_else(|| OrderHistory {
        first_order_date: customer.last_order_date,
        total_orders: customer.order_count_6_months,
        total_lifetime_value: customer.total_6_month_value,
        average_days_between_orders: 0.0,
        trend: Trend::Stable,
    });
    let segment = segmentation::segment(&customer, win_back.score, order_history.total_orders);

    let mut enhanced = EnhancedCustomerData {
        customer,
        seasonal_pattern,
        product_preferences,
        win_back,
        segment,
        order_history,
        talking_points: Vec::new(),
    };
    enhanced.talking_points = insights::talking_points(&enhanced);
    enhanced
}
