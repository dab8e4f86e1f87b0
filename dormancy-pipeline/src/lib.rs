//! Dormant customer analytics.
//!
//! Turns a sales-transaction export and a customer-to-salesperson
//! assignment sheet into a report of customers who bought inside the
//! lookback window but have since gone quiet. Each dormant customer is
//! scored for churn risk and win-back probability, segmented, and rolled
//! up by salesperson, product and geography, with a recovery forecast and
//! plain-language insights on top.
//!
//! Two entry points:
//! - [`DormantReportPipeline`] runs the full enriched analysis over
//!   in-memory tables.
//! - [`StreamingReportPipeline`] produces the basic report from a file in
//!   bounded memory.

pub mod aggregator;
pub mod components;
pub mod config;
pub mod dormancy;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod filter;
pub mod forecast;
pub mod history;
pub mod insights;
pub mod pipelines;
pub mod products;
pub mod quality;
pub mod query;
pub mod report;
pub mod rollups;
pub mod seasonal;
pub mod segmentation;
pub mod selector;
pub mod side_effect;
pub mod table_loader;
pub mod thresholds;
pub mod types;
pub mod util;
pub mod win_back;

#[cfg(test)]
mod test_support;

pub use config::AnalysisConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipelines::dormant_report::{AnalysisRequest, DormantReportPipeline};
pub use pipelines::streaming_report::StreamingReportPipeline;
pub use report::{AnalysisResult, BasicReport, ReportSummary};
