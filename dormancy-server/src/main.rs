use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use dormancy_pipeline::components::csv_export_side_effect::CsvExportSideEffect;
use dormancy_pipeline::export::{write_csv_file, ExportRow};
use dormancy_pipeline::table_loader::{load_assignments_file, load_transactions_file};
use dormancy_pipeline::util::format_dollars;
use dormancy_pipeline::{
    AnalysisConfig, AnalysisRequest, AnalysisResult, BasicReport, DormantReportPipeline,
    ReportSummary, StreamingReportPipeline,
};

#[derive(Parser, Debug)]
#[command(
    name = "dormancy-report",
    about = "Find customers who have gone quiet and rank them for win-back"
)]
struct Args {
    /// Sales transaction export (CSV)
    transactions: PathBuf,

    /// Customer-to-salesperson assignment sheet (CSV)
    assignments: PathBuf,

    /// JSON file overriding analysis settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the JSON result instead of formatted text
    #[arg(long)]
    json: bool,

    /// Also write the dormant customer list to this CSV file
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Bounded-memory basic report (no win-back, segments or forecast)
    #[arg(long)]
    streaming: bool,

    /// Customers listed in the text report
    #[arg(long, default_value_t = 10)]
    top: usize,
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson<'a, T: Serialize> {
    generated_at: String,
    mode: &'static str,
    load_ms: u128,
    pipeline_ms: u128,
    report: &'a T,
}

fn print_json<T: Serialize>(
    report: &T,
    mode: &'static str,
    load_ms: u128,
    pipeline_ms: u128,
) -> Result<()> {
    let out = ReportJson {
        generated_at: Utc::now().to_rfc3339(),
        mode,
        load_ms,
        pipeline_ms,
        report,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serializing report")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn print_banner(title: &str) {
    let rule = "\u{2550}".repeat(64);
    println!();
    println!("  \u{2554}{}\u{2557}", rule);
    println!("  \u{2551}{:^64}\u{2551}", title);
    println!("  \u{255a}{}\u{255d}", rule);
    println!();
}

fn print_summary(summary: &ReportSummary) {
    println!(
        "  Reference {}  \u{00b7}  window {} to {}",
        summary.reference_date, summary.window_start, summary.recency_threshold
    );
    println!(
        "  {} customers in window  \u{00b7}  {} dormant  \u{00b7}  {} at risk",
        summary.customers_in_window,
        summary.dormant_customer_count,
        format_dollars(summary.total_value_at_risk)
    );
    println!(
        "  {} high value  \u{00b7}  {} quick wins  \u{00b7}  {} salespeople  \u{00b7}  {} potential recovery",
        summary.high_value_dormant_count,
        summary.quick_win_count,
        summary.salesperson_count,
        format_dollars(summary.potential_recovery)
    );
    println!();
}

fn print_human(result: &AnalysisResult, top: usize, load_ms: u128, pipeline_ms: u128) {
    print_banner("DORMANT CUSTOMER REPORT");
    print_summary(&result.summary);

    println!("  {:\u{2500}<64}", "");
    for (i, e) in result.dormant_customers.iter().take(top).enumerate() {
        let c = &e.customer;
        let urgency_icon = match e.win_back.score {
            s if s > 0.7 => "!!",
            s if s > 0.5 => "! ",
            _ => "  ",
        };
        println!(
            "  {} {:>2}. {:24} {:>12}  {:10} {:>4}d",
            urgency_icon,
            i + 1,
            c.customer,
            format_dollars(c.total_6_month_value),
            e.segment.segment.to_string(),
            c.days_since_order,
        );
        println!(
            "       rep {}  \u{00b7}  churn {:.0}%  \u{00b7}  win-back {:.0}%  \u{00b7}  {}",
            c.salesperson,
            c.churn_risk_score * 100.0,
            e.win_back.score * 100.0,
            e.seasonal_pattern.label,
        );
        println!("       {}", e.win_back.recommendation);
        if let Some(pref) = e.product_preferences.first() {
            println!(
                "       favorite {} ({}, {})",
                pref.product,
                format_dollars(pref.total_value),
                pref.trend
            );
        }
        for point in &e.talking_points {
            println!("       - {}", point);
        }
        println!();
    }
    println!("  {:\u{2500}<64}", "");

    println!();
    for (key, text) in &result.insights {
        println!("  {:26} {}", key, text);
    }
    if !result.rep_performance.needs_attention.is_empty() {
        println!(
            "  {:26} {}",
            "needs_attention",
            result.rep_performance.needs_attention.join(", ")
        );
    }

    let s = result.revenue_forecast.scenarios;
    println!();
    println!(
        "  Recovery forecast: {} conservative \u{00b7} {} realistic \u{00b7} {} optimistic",
        format_dollars(s.conservative),
        format_dollars(s.realistic),
        format_dollars(s.optimistic)
    );
    print_footer(result.data_quality.data_accuracy_score, load_ms, pipeline_ms);
}

fn print_basic(report: &BasicReport, top: usize, load_ms: u128, pipeline_ms: u128) {
    print_banner("DORMANT CUSTOMER REPORT (streaming)");
    print_summary(&report.summary);

    println!("  {:\u{2500}<64}", "");
    for (i, c) in report.dormant_customers.iter().take(top).enumerate() {
        println!(
            "     {:>2}. {:24} {:>12}  {:>4}d  churn {:.0}%  rep {}",
            i + 1,
            c.customer,
            format_dollars(c.total_6_month_value),
            c.days_since_order,
            c.churn_risk_score * 100.0,
            c.salesperson,
        );
    }
    println!("  {:\u{2500}<64}", "");
    print_footer(report.data_quality.data_accuracy_score, load_ms, pipeline_ms);
}

fn print_footer(accuracy: f64, load_ms: u128, pipeline_ms: u128) {
    println!();
    println!("  Data accuracy {:.0}%", accuracy * 100.0);
    println!(
        "  \u{23f1}  CSV loaded in {}ms \u{00b7} Pipeline ran in {}ms \u{00b7} Total {}ms",
        load_ms,
        pipeline_ms,
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let request_id = format!("report-{}", Utc::now().format("%Y%m%d%H%M%S"));

    let load_start = Instant::now();
    let assignments = load_assignments_file(&args.assignments)
        .with_context(|| format!("loading assignments {}", args.assignments.display()))?;
    log::info!(
        "request_id={} loaded {} assignment rows from {}",
        request_id,
        assignments.len(),
        args.assignments.display()
    );

    if args.streaming {
        let load_ms = load_start.elapsed().as_millis();
        let pipeline_start = Instant::now();
        let report = StreamingReportPipeline::new(config)?
            .run_file(&request_id, &args.transactions, &assignments)
            .with_context(|| format!("analyzing {}", args.transactions.display()))?;
        let pipeline_ms = pipeline_start.elapsed().as_millis();

        if let Some(path) = &args.csv_out {
            write_csv_file(path, report.dormant_customers.iter().map(ExportRow::from))
                .with_context(|| format!("writing {}", path.display()))?;
        }
        if args.json {
            print_json(&report, "streaming", load_ms, pipeline_ms)?;
        } else {
            print_basic(&report, args.top, load_ms, pipeline_ms);
        }
        return Ok(());
    }

    let transactions = load_transactions_file(&args.transactions)
        .with_context(|| format!("loading transactions {}", args.transactions.display()))?;
    let load_ms = load_start.elapsed().as_millis();

    let mut pipeline = DormantReportPipeline::new(config)?;
    if let Some(path) = &args.csv_out {
        pipeline = pipeline.with_side_effect(Box::new(CsvExportSideEffect::new(path)));
    }
    let pipeline_start = Instant::now();
    let result = pipeline
        .run(&AnalysisRequest {
            request_id,
            transactions,
            assignments,
        })
        .context("running dormant customer analysis")?;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if args.json {
        print_json(&result, "full", load_ms, pipeline_ms)?;
    } else {
        print_human(&result, args.top, load_ms, pipeline_ms);
    }
    Ok(())
}
