//! CSV loaders for the transaction export and the assignment sheet.
//!
//! Sales exports arrive with report title rows above the real header, so
//! the header is detected as the first row (within `MAX_HEADER_SCAN`) that
//! names both a customer and a date column. Column names are matched
//! case-insensitively against a list of aliases per field.
//!
//! Cell-level problems never fail a load: an unparseable date becomes
//! `None` and an unparseable price becomes 0 with `price_valid = false`.
//! The aggregator counts both. Only structural problems (no header, a
//! required column missing, no data at all) are errors.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{StringRecord, StringRecordsIntoIter};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{AssignmentRecord, Location, TransactionRecord};

/// Rows searched for a header before giving up.
const MAX_HEADER_SCAN: usize = 10;

const DATE_ALIASES: &[&str] = &["posted date", "invoice date", "order date", "date"];
const CUSTOMER_ALIASES: &[&str] = &["customer", "customer name"];
const SALESPERSON_ALIASES: &[&str] = &["salesperson", "sales rep", "rep"];
const PRODUCT_ALIASES: &[&str] = &["item", "product", "line item", "description"];
const QUANTITY_ALIASES: &[&str] = &["qty", "quantity"];
const PRICE_ALIASES: &[&str] = &["net price", "net amount", "amount", "total"];
const CITY_ALIASES: &[&str] = &["ship city", "city"];
const STATE_ALIASES: &[&str] = &["ship state", "state", "province"];
const POSTAL_ALIASES: &[&str] = &["ship zip", "zip", "postal code"];

const ASSIGNMENT_REP_KEYWORDS: &[&str] = &["rep", "salesperson", "assigned"];
const ASSIGNMENT_TARGET_KEYWORDS: &[&str] = &["target", "goal"];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y", "%d-%b-%Y"];

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Column positions resolved from the transaction header row.
#[derive(Clone, Debug)]
struct TransactionColumns {
    date: usize,
    customer: usize,
    salesperson: Option<usize>,
    product: usize,
    quantity: Option<usize>,
    net_price: usize,
    city: Option<usize>,
    state: Option<usize>,
    postal_code: Option<usize>,
}

impl TransactionColumns {
    /// Resolve columns from a candidate header. Returns `Ok(None)` when the
    /// row is not a header at all, and an error when it is a header that
    /// lacks a required column.
    fn resolve(row: &StringRecord) -> PipelineResult<Option<Self>> {
        let headers = normalize_headers(row);
        let (Some(date), Some(customer)) = (
            find_column(&headers, DATE_ALIASES),
            find_column(&headers, CUSTOMER_ALIASES),
        ) else {
            return Ok(None);
        };

        let product = find_column(&headers, PRODUCT_ALIASES).ok_or(PipelineError::MissingColumn {
            table: "transaction",
            column: "item",
        })?;
        let net_price = find_column(&headers, PRICE_ALIASES).ok_or(PipelineError::MissingColumn {
            table: "transaction",
            column: "net price",
        })?;

        Ok(Some(Self {
            date,
            customer,
            salesperson: find_column(&headers, SALESPERSON_ALIASES),
            product,
            quantity: find_column(&headers, QUANTITY_ALIASES),
            net_price,
            city: find_column(&headers, CITY_ALIASES),
            state: find_column(&headers, STATE_ALIASES),
            postal_code: find_column(&headers, POSTAL_ALIASES),
        }))
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> TransactionRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
        let optional = |idx: Option<usize>| idx.map(cell).unwrap_or("").to_string();

        let price = parse_money(cell(self.net_price));
        TransactionRecord {
            line,
            date: parse_date(cell(self.date)),
            customer: cell(self.customer).to_string(),
            salesperson: optional(self.salesperson),
            product: cell(self.product).to_string(),
            quantity: self
                .quantity
                .and_then(|idx| parse_money(cell(idx)))
                .unwrap_or(0.0),
            net_price: price.unwrap_or(0.0),
            price_valid: price.is_some(),
            location: Location {
                city: optional(self.city),
                state: optional(self.state),
                postal_code: optional(self.postal_code),
            },
        }
    }
}

/// Iterator over transaction rows in fixed-size chunks.
///
/// Each item is one chunk; the final chunk may be shorter. Used by the
/// streaming report so that only one chunk of raw rows is alive at a time.
pub struct TransactionChunks<R: Read> {
    rows: StringRecordsIntoIter<R>,
    columns: TransactionColumns,
    chunk_size: usize,
}

impl<R: Read> TransactionChunks<R> {
    /// Detect the header and prepare to read rows in chunks.
    pub fn new(reader: R, chunk_size: usize) -> PipelineResult<Self> {
        let (rows, columns) = open_transactions(reader)?;
        Ok(Self {
            rows,
            columns,
            chunk_size: chunk_size.max(1),
        })
    }
}

impl<R: Read> Iterator for TransactionChunks<R> {
    type Item = PipelineResult<Vec<TransactionRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.rows.next() {
                Some(Ok(row)) => {
                    if is_blank(&row) {
                        continue;
                    }
                    let line = line_number(&row);
                    chunk.push(self.columns.parse_row(&row, line));
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => break,
            }
        }
        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

/// Load every transaction row from a CSV reader.
pub fn load_transactions<R: Read>(reader: R) -> PipelineResult<Vec<TransactionRecord>> {
    let mut records = Vec::new();
    for chunk in TransactionChunks::new(reader, crate::thresholds::DEFAULT_CHUNK_SIZE)? {
        records.extend(chunk?);
    }
    if records.is_empty() {
        return Err(PipelineError::EmptyInput("transaction"));
    }
    Ok(records)
}

/// Load transactions from a CSV file path.
pub fn load_transactions_file(path: impl AsRef<Path>) -> PipelineResult<Vec<TransactionRecord>> {
    load_transactions(File::open(path)?)
}

/// Result of the cheap first pass over a transaction file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateScan {
    /// Latest parseable date on a row that names a customer.
    pub max_date: Option<NaiveDate>,
    /// Non-blank data rows seen.
    pub rows: usize,
}

/// First pass for the streaming report: find the reference date without
/// keeping any rows.
pub fn scan_max_date<R: Read>(reader: R) -> PipelineResult<DateScan> {
    let (rows, columns) = open_transactions(reader)?;
    let mut scan = DateScan::default();
    for row in rows {
        let row = row?;
        if is_blank(&row) {
            continue;
        }
        scan.rows += 1;
        let has_customer = !row.get(columns.customer).unwrap_or("").trim().is_empty();
        if let Some(date) = row.get(columns.date).and_then(|d| parse_date(d.trim())) {
            if has_customer && scan.max_date.map_or(true, |m| date > m) {
                scan.max_date = Some(date);
            }
        }
    }
    Ok(scan)
}

fn open_transactions<R: Read>(
    reader: R,
) -> PipelineResult<(StringRecordsIntoIter<R>, TransactionColumns)> {
    let mut rows = csv_reader(reader).into_records();
    let mut scanned = 0;
    let mut first_row: Option<StringRecord> = None;

    while scanned < MAX_HEADER_SCAN {
        let Some(row) = rows.next() else { break };
        let row = row?;
        scanned += 1;
        if let Some(columns) = TransactionColumns::resolve(&row)? {
            return Ok((rows, columns));
        }
        first_row.get_or_insert(row);
    }

    match first_row {
        None => Err(PipelineError::EmptyInput("transaction")),
        Some(row) => {
            let headers = normalize_headers(&row);
            let column = if find_column(&headers, CUSTOMER_ALIASES).is_some() {
                "date"
            } else {
                "customer"
            };
            Err(PipelineError::MissingColumn {
                table: "transaction",
                column,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct AssignmentColumns {
    customer: usize,
    salesperson: usize,
    targets: Vec<(usize, String)>,
}

impl AssignmentColumns {
    fn resolve(row: &StringRecord) -> Option<Self> {
        let headers = normalize_headers(row);
        let is_rep = |h: &str| ASSIGNMENT_REP_KEYWORDS.iter().any(|kw| h.contains(kw));

        let customer = headers
            .iter()
            .position(|h| h.contains("customer") && !is_rep(h.as_str()))
            .or_else(|| headers.iter().position(|h| h.contains("customer")))?;
        let salesperson = headers
            .iter()
            .enumerate()
            .position(|(i, h)| i != customer && is_rep(h.as_str()))?;

        let targets = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| {
                *i != customer
                    && *i != salesperson
                    && ASSIGNMENT_TARGET_KEYWORDS.iter().any(|kw| h.contains(kw))
            })
            .map(|(i, _)| (i, row.get(i).unwrap_or("").trim().to_string()))
            .collect();

        Some(Self {
            customer,
            salesperson,
            targets,
        })
    }
}

/// Load the customer-to-salesperson assignment sheet from a CSV reader.
pub fn load_assignments<R: Read>(reader: R) -> PipelineResult<Vec<AssignmentRecord>> {
    let mut rows = csv_reader(reader).into_records();
    let mut columns = None;
    let mut scanned = 0;
    let mut saw_customer_header = false;

    while scanned < MAX_HEADER_SCAN {
        let Some(row) = rows.next() else { break };
        let row = row?;
        scanned += 1;
        if let Some(resolved) = AssignmentColumns::resolve(&row) {
            columns = Some(resolved);
            break;
        }
        saw_customer_header |= normalize_headers(&row)
            .iter()
            .any(|h| h.contains("customer"));
    }

    let Some(columns) = columns else {
        if scanned == 0 {
            return Err(PipelineError::EmptyInput("assignment"));
        }
        return Err(PipelineError::MissingColumn {
            table: "assignment",
            column: if saw_customer_header {
                "salesperson"
            } else {
                "customer"
            },
        });
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let customer = row.get(columns.customer).unwrap_or("").trim();
        if customer.is_empty() {
            continue;
        }
        let targets = columns
            .targets
            .iter()
            .filter_map(|(idx, name)| {
                row.get(*idx)
                    .and_then(|v| parse_money(v.trim()))
                    .map(|v| (name.clone(), v))
            })
            .collect::<BTreeMap<_, _>>();
        records.push(AssignmentRecord {
            customer: customer.to_string(),
            salesperson: row.get(columns.salesperson).unwrap_or("").trim().to_string(),
            targets,
        });
    }
    Ok(records)
}

/// Load the assignment sheet from a CSV file path.
pub fn load_assignments_file(path: impl AsRef<Path>) -> PipelineResult<Vec<AssignmentRecord>> {
    load_assignments(File::open(path)?)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a date cell. A trailing time part (`2025-01-15 08:30`,
/// `2025-01-15T08:30:00Z`) is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.trim().split([' ', 'T']).next()?;
    if token.is_empty() {
        return None;
    }
    // Two-digit years would otherwise parse as year 0024 under %Y.
    let parts: Vec<&str> = token.split('/').collect();
    let short_year = parts.len() == 3 && parts[0].len() <= 2 && parts[2].len() == 2;
    if short_year {
        return NaiveDate::parse_from_str(token, "%m/%d/%y").ok();
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Parse a money or quantity cell: `$1,234.50`, `(45.00)`, `-3`.
pub fn parse_money(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn normalize_headers(row: &StringRecord) -> Vec<String> {
    row.iter().map(|h| h.trim().to_lowercase()).collect()
}

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn line_number(row: &StringRecord) -> usize {
    row.position().map(|p| p.line() as usize).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES_CSV: &str = "\
Sales by Customer Detail,,,,,,,
\"Jan 1, 2025 - Jun 30, 2025\",,,,,,,
Posted date,Customer,Salesperson,Item,Qty,Net price,Ship city,Ship state
06/02/2025,Club A,Rep1,Cabernet Sauvignon 2019,12,\"$1,105.50\",Napa,CA
2025-05-20,Club B,,Pinot Noir,6,450.00,Portland,OR
not-a-date,Club C,Rep3,Merlot,1,20,,
06/15/2025,,Rep3,Merlot,1,20,,
06/16/25,Club D,Rep4,Shipping Fee,1,(15.00),,
";

    #[test]
    fn load_sample_csv_skips_preamble() {
        let records = load_transactions(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);

        let first = &records[0];
        assert_eq!(first.customer, "Club A");
        assert_eq!(first.salesperson, "Rep1");
        assert_eq!(first.product, "Cabernet Sauvignon 2019");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 6, 2));
        assert!((first.net_price - 1105.50).abs() < 0.01);
        assert!((first.quantity - 12.0).abs() < 0.01);
        assert_eq!(first.location.city, "Napa");
        assert_eq!(first.location.state, "CA");
        assert_eq!(first.line, 4);
    }

    #[test]
    fn cell_problems_do_not_fail_the_load() {
        let records = load_transactions(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(records[1].salesperson, "");
        assert!(records[2].date.is_none());
        assert!(records[3].customer.is_empty());
        assert_eq!(records[4].date, NaiveDate::from_ymd_opt(2025, 6, 16));
        assert!((records[4].net_price + 15.0).abs() < 0.01);
    }

    #[test]
    fn missing_price_column_is_structural() {
        let csv_data = "Posted date,Customer,Item\n01/02/2025,Club A,Merlot\n";
        let err = load_transactions(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumn {
                column: "net price",
                ..
            }
        ));
    }

    #[test]
    fn missing_date_column_is_reported() {
        let csv_data = "Customer,Item,Net price\nClub A,Merlot,10\n";
        let err = load_transactions(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column: "date", .. }));
    }

    #[test]
    fn header_only_file_is_empty_input() {
        let csv_data = "Posted date,Customer,Item,Net price\n";
        let err = load_transactions(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput("transaction")));
    }

    #[test]
    fn chunks_respect_size() {
        let chunks: Vec<_> = TransactionChunks::new(SALES_CSV.as_bytes(), 2)
            .unwrap()
            .map(|c| c.unwrap().len())
            .collect();
        assert_eq!(chunks, vec![2, 2, 1]);
    }

    #[test]
    fn scan_finds_latest_date_with_customer() {
        // 06/15/2025 has no customer, so it does not count.
        let scan = scan_max_date(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(scan.max_date, NaiveDate::from_ymd_opt(2025, 6, 16));
        assert_eq!(scan.rows, 5);
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 22);
        assert_eq!(parse_date("7/22/2024"), expected);
        assert_eq!(parse_date("2024-07-22"), expected);
        assert_eq!(parse_date("2024/07/22"), expected);
        assert_eq!(parse_date("22-Jul-2024"), expected);
        assert_eq!(parse_date("07/22/24"), expected);
        assert_eq!(parse_date("2024-07-22T10:15:00Z"), expected);
        assert_eq!(parse_date("7/22/2024 10:15"), expected);
        assert_eq!(parse_date("bad_date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn money_formats() {
        assert_eq!(parse_money("$1,234.50"), Some(1234.50));
        assert_eq!(parse_money("(45.00)"), Some(-45.0));
        assert_eq!(parse_money("-3"), Some(-3.0));
        assert_eq!(parse_money("invalid_price"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("NaN"), None);
    }

    #[test]
    fn load_assignment_sheet_with_targets() {
        let csv_data = "\
Customer,Assigned Rep,Territory,Q3 Target
Club A,Rep1,North,\"12,000\"
  ,Rep9,South,100
club b,Rep2,South,
";
        let records = load_assignments(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer, "Club A");
        assert_eq!(records[0].salesperson, "Rep1");
        assert_eq!(records[0].targets.get("Q3 Target"), Some(&12_000.0));
        assert_eq!(records[1].customer, "club b");
        assert!(records[1].targets.is_empty());
    }

    #[test]
    fn assignment_sheet_without_rep_column_fails() {
        let csv_data = "Customer,Territory\nClub A,North\n";
        let err = load_assignments(csv_data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumn {
                table: "assignment",
                column: "salesperson"
            }
        ));
    }
}
