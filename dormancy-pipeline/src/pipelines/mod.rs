pub mod dormant_report;
pub mod streaming_report;
