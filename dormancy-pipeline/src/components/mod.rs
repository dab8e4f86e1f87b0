pub mod csv_export_side_effect;
pub mod dormancy_filter;
pub mod result_store_side_effect;
pub mod summary_log_side_effect;
pub mod value_at_risk_selector;
