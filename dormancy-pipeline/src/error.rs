//! Pipeline error types.
//!
//! Only structural failures live here. Row-level problems are counted in
//! the data quality report and never abort a run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{table} table is missing required column: {column}")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("{0} table has no data rows")]
    EmptyInput(&'static str),

    #[error("No valid transaction rows ({invalid} of {total} rows rejected)")]
    NoValidTransactions { total: usize, invalid: usize },

    #[error("No dormant customers found between {window_start} and {recency_threshold}")]
    NoDormantCustomers {
        window_start: chrono::NaiveDate,
        recency_threshold: chrono::NaiveDate,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Side effect {name} failed: {reason}")]
    SideEffect { name: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
