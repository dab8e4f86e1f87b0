use std::path::PathBuf;

use crate::export::{write_csv_file, ExportRow};
use crate::query::AnalysisQuery;
use crate::report::AnalysisResult;
use crate::side_effect::{SideEffect, SideEffectInput};

/// Writes the dormant customer list to a CSV file after each run.
pub struct CsvExportSideEffect {
    pub path: PathBuf,
}

impl CsvExportSideEffect {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SideEffect<AnalysisQuery, AnalysisResult> for CsvExportSideEffect {
    fn run(&self, input: &SideEffectInput<'_, AnalysisQuery, AnalysisResult>) -> Result<(), String> {
        let rows = input.result.dormant_customers.iter().map(ExportRow::from);
        write_csv_file(&self.path, rows).map_err(|e| e.to_string())?;
        log::info!(
            "request_id={} exported {} customers to {}",
            input.query.request_id,
            input.result.dormant_customers.len(),
            self.path.display()
        );
        Ok(())
    }
}
