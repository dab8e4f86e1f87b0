use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::aggregator::{AssignmentMap, CustomerAggregator};
use crate::components::dormancy_filter::DormancyFilter;
use crate::components::value_at_risk_selector::ValueAtRiskSelector;
use crate::config::AnalysisConfig;
use crate::dormancy;
use crate::error::{PipelineError, PipelineResult};
use crate::filter::Filter;
use crate::insights;
use crate::query::{AnalysisQuery, AnalysisWindow};
use crate::report::{BasicReport, ReportSummary};
use crate::rollups;
use crate::selector::Selector;
use crate::table_loader::{scan_max_date, TransactionChunks};
use crate::types::{AssignmentRecord, CustomerAggregate};

/// Basic dormant customer report for transaction files too large to hold
/// in memory.
///
/// Rows are read in chunks of `AnalysisConfig::chunk_size` and only the
/// per-customer aggregates survive between chunks, so memory grows with
/// the number of customers rather than rows. Without a configured
/// reference date the input is read twice: once to find the latest date,
/// once to aggregate.
pub struct StreamingReportPipeline {
    config: AnalysisConfig,
    selector: ValueAtRiskSelector,
}

impl StreamingReportPipeline {
    pub fn new(config: AnalysisConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            selector: ValueAtRiskSelector::default(),
        })
    }

    /// Run over a transaction file on disk.
    pub fn run_file(
        &self,
        request_id: &str,
        transactions: &Path,
        assignments: &[AssignmentRecord],
    ) -> PipelineResult<BasicReport> {
        self.run(request_id, || Ok(File::open(transactions)?), assignments)
    }

    /// Run over a transaction source that `open` can produce afresh for
    /// each pass.
    pub fn run<R, F>(
        &self,
        request_id: &str,
        open: F,
        assignments: &[AssignmentRecord],
    ) -> PipelineResult<BasicReport>
    where
        R: Read,
        F: Fn() -> PipelineResult<R>,
    {
        let reference_date = match self.config.reference_date {
            Some(date) => date,
            None => {
                let scan = scan_max_date(open()?)?;
                log::debug!(
                    "request_id={} scan pass: {} rows, latest date {:?}",
                    request_id,
                    scan.rows,
                    scan.max_date
                );
                if scan.rows == 0 {
                    return Err(PipelineError::EmptyInput("transaction"));
                }
                scan.max_date.ok_or(PipelineError::NoValidTransactions {
                    total: scan.rows,
                    invalid: scan.rows,
                })?
            }
        };
        let window = AnalysisWindow::new(reference_date, &self.config)?;
        let query = AnalysisQuery::new(request_id, window, self.config.clone());

        let assignment_map = AssignmentMap::from_records(assignments);
        let mut aggregator = CustomerAggregator::new(window, &assignment_map, &self.config, false);
        let mut chunks = 0usize;
        for chunk in TransactionChunks::new(open()?, self.config.chunk_size)? {
            let chunk = chunk?;
            chunks += 1;
            for record in &chunk {
                aggregator.push(record);
            }
        }
        if chunks == 0 {
            return Err(PipelineError::EmptyInput("transaction"));
        }
        let aggregation = aggregator.finish()?;
        log::debug!(
            "request_id={} aggregated {} chunks into {} customers in window",
            request_id,
            chunks,
            aggregation.customers.len()
        );

        let customers_in_window = aggregation.customers.len();
        let candidates: Vec<CustomerAggregate> = aggregation.customers.into_values().collect();
        let kept = DormancyFilter.filter(&query, candidates)?.kept;
        if kept.is_empty() {
            return Err(PipelineError::NoDormantCustomers {
                window_start: window.window_start,
                recency_threshold: window.recency_threshold,
            });
        }

        let dormant = self
            .selector
            .select(&query, kept.into_iter().map(dormancy::score).collect());
        let summaries = self.selector.select(
            &query,
            rollups::basic_salesperson_summaries(&dormant, &self.config),
        );
        let geography = rollups::geographic_distribution(&dormant);
        let rep_performance = insights::rep_performance(&summaries);
        let summary = ReportSummary::from_parts(&window, customers_in_window, &dormant, &summaries);

        log::info!(
            "request_id={} streaming report: {} dormant customers, {} value at risk",
            request_id,
            summary.dormant_customer_count,
            crate::util::format_dollars(summary.total_value_at_risk)
        );

        Ok(BasicReport {
            request_id: request_id.to_string(),
            summary,
            salesperson_summaries: summaries,
            rep_performance,
            dormant_customers: dormant,
            geographic_distribution: geography,
            data_quality: aggregation.quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES: &str = "\
Posted date,Customer,Salesperson,Item,Qty,Net price,Ship state
06/30/2025,Active,Rep9,Merlot,1,10.00,CA
04/01/2025,Quiet,Rep1,Merlot,1,500.00,OR
03/01/2025,Quiet,Rep1,Pinot Noir,1,250.00,OR
bad,Quiet,Rep1,Pinot Noir,1,250.00,OR
";

    #[test]
    fn small_chunks_give_basic_report() {
        let config = AnalysisConfig {
            chunk_size: 1,
            ..AnalysisConfig::default()
        };
        let pipeline = StreamingReportPipeline::new(config).unwrap();
        let report = pipeline.run("req", || Ok(SALES.as_bytes()), &[]).unwrap();

        assert_eq!(report.dormant_customers.len(), 1);
        let quiet = &report.dormant_customers[0];
        assert_eq!(quiet.customer, "Quiet");
        assert_eq!(quiet.salesperson, "Rep1");
        assert!((quiet.total_6_month_value - 750.0).abs() < 1e-9);
        assert_eq!(report.data_quality.invalid_dates, 1);
        assert_eq!(report.geographic_distribution["OR"].customer_count, 1);
        assert_eq!(report.salesperson_summaries[0].average_win_back_score, 0.0);
        assert_eq!(report.data_quality.duplicate_records, None);
        assert_eq!(report.rep_performance.top_salesperson.as_deref(), Some("Rep1"));
    }

    #[test]
    fn empty_source_is_reported() {
        let pipeline = StreamingReportPipeline::new(AnalysisConfig::default()).unwrap();
        let err = pipeline
            .run("req", || Ok("Posted date,Customer,Item,Net price\n".as_bytes()), &[])
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput("transaction")));
    }
}
