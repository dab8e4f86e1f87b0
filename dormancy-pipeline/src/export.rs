//! CSV export of the dormant customer list, one row per customer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::PipelineResult;
use crate::thresholds::EXPORT_TOP_PRODUCTS;
use crate::types::{DormantCustomer, EnhancedCustomerData};

/// One CSV line. For enriched customers "Top Products" lists the
/// highest-value products first. Basic (streaming) rows carry no per-product
/// totals, so there it lists the first products in name order.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Salesperson")]
    pub salesperson: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Last Order Date")]
    pub last_order_date: String,
    #[serde(rename = "Days Since Order")]
    pub days_since_order: i64,
    #[serde(rename = "6-Month Value")]
    pub value_6_months: String,
    #[serde(rename = "Churn Risk %")]
    pub churn_risk_pct: String,
    #[serde(rename = "Win-Back %")]
    pub win_back_pct: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Top Products")]
    pub top_products: String,
}

impl ExportRow {
    fn base(customer: &DormantCustomer) -> Self {
        Self {
            customer: customer.customer.clone(),
            salesperson: customer.salesperson.clone(),
            segment: String::new(),
            last_order_date: customer.last_order_date.format("%Y-%m-%d").to_string(),
            days_since_order: customer.days_since_order,
            value_6_months: format!("{:.2}", customer.total_6_month_value),
            churn_risk_pct: format!("{:.1}", customer.churn_risk_score * 100.0),
            win_back_pct: String::new(),
            location: customer.location.to_string(),
            top_products: customer
                .products
                .iter()
                .take(EXPORT_TOP_PRODUCTS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&EnhancedCustomerData> for ExportRow {
    fn from(enhanced: &EnhancedCustomerData) -> Self {
        let mut row = ExportRow::base(&enhanced.customer);
        row.segment = enhanced.segment.segment.to_string();
        row.win_back_pct = format!("{:.1}", enhanced.win_back.score * 100.0);
        if !enhanced.product_preferences.is_empty() {
            row.top_products = enhanced
                .product_preferences
                .iter()
                .take(EXPORT_TOP_PRODUCTS)
                .map(|p| p.product.as_str())
                .collect::<Vec<_>>()
                .join(", ");
        }
        row
    }
}

/// Segment and win-back are left blank; products are in name order.
impl From<&DormantCustomer> for ExportRow {
    fn from(customer: &DormantCustomer) -> Self {
        ExportRow::base(customer)
    }
}

/// Write export rows with a header line. Fields containing commas or
/// quotes are quoted by the CSV writer.
pub fn write_csv<W, I>(writer: W, rows: I) -> PipelineResult<()>
where
    W: Write,
    I: IntoIterator<Item = ExportRow>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file<I>(path: impl AsRef<Path>, rows: I) -> PipelineResult<()>
where
    I: IntoIterator<Item = ExportRow>,
{
    write_csv(File::create(path)?, rows)
}
