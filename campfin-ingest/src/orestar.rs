//! Read ORESTAR campaign-finance transaction exports (CSV).
//!
//! The state publishes each committee's transactions as a spreadsheet; its
//! CSV export may start with a few title rows before the header:
//! Tran Id,Original Id,Tran Date,Tran Status,Filer,Contributor/Payee,
//! Sub Type,Amount,Aggregate Amount,...
//!
//! Only `Tran Date`, `Sub Type` and `Amount` are required; `Tran Id` is
//! carried along when present so errors can point at the source row.

use campfin_core::TransactionRecord;
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::types::{IngestError, columns};

// $1,234.50  -12  (12.00)  1234
const AMOUNT_PATTERN: &str =
    r"^(?P<open>\()?\s*(?P<neg>-)?\s*\$?\s*(?P<num>\d[\d,]*(?:\.\d+)?|\.\d+)\s*(?P<close>\))?$";

struct Columns {
    date: usize,
    sub_type: usize,
    amount: usize,
    id: Option<usize>,
}

impl Columns {
    fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| record.iter().position(|f| f.trim() == name);
        Some(Self {
            date: find(columns::TRAN_DATE)?,
            sub_type: find(columns::SUB_TYPE)?,
            amount: find(columns::AMOUNT)?,
            id: find(columns::TRAN_ID),
        })
    }
}

/// Parse an ORESTAR CSV export from disk.
pub fn read_orestar_csv(path: impl AsRef<Path>) -> Result<Vec<TransactionRecord>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_orestar_reader(file)?;
    tracing::debug!(path = %path.display(), records = records.len(), "read ORESTAR export");
    Ok(records)
}

/// Parse an ORESTAR CSV export from any reader.
///
/// Rows before the header are ignored, as are rows whose date, subtype and
/// amount are all blank. A row with data but no date is a `BadDate`.
/// Amounts are returned as written: a negative amount is passed through for
/// the classifier to reject.
pub fn read_orestar_reader<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let amount_re = Regex::new(AMOUNT_PATTERN)?;

    let mut cols: Option<Columns> = None;
    let mut out = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 1);

        let Some(c) = &cols else {
            cols = Columns::from_header(&record);
            continue;
        };

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let date_str = field(c.date);
        let amount_str = field(c.amount);
        let sub_type = field(c.sub_type);
        if date_str.is_empty() && amount_str.is_empty() && sub_type.is_empty() {
            continue;
        }
        let date = parse_tran_date(date_str).ok_or_else(|| IngestError::BadDate {
            row,
            value: date_str.to_string(),
        })?;

        let amount = parse_amount(&amount_re, amount_str).ok_or_else(|| IngestError::BadAmount {
            row,
            value: amount_str.to_string(),
        })?;

        let mut txn = TransactionRecord::new(date, sub_type, amount).with_row(row);
        if let Some(id) = c.id.and_then(|idx| record.get(idx)).map(str::trim) {
            if !id.is_empty() {
                txn = txn.with_id(id);
            }
        }
        out.push(txn);
    }

    if cols.is_none() {
        return Err(IngestError::HeaderNotFound(vec![
            columns::TRAN_DATE,
            columns::SUB_TYPE,
            columns::AMOUNT,
        ]));
    }

    Ok(out)
}

/// Accepts `MM/DD/YYYY`, `MM/DD/YY` and `YYYY-MM-DD`. A trailing time
/// component ("00:00:00", "12:00:00 AM") is ignored.
pub fn parse_tran_date(s: &str) -> Option<NaiveDate> {
    let head = s.split_whitespace().next()?;
    // %y before %Y: %Y would read "24" as the year 24.
    ["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

fn parse_amount(re: &Regex, s: &str) -> Option<Decimal> {
    let caps = re.captures(s)?;
    let parens = caps.name("open").is_some();
    if parens != caps.name("close").is_some() {
        return None;
    }
    let mut digits = caps["num"].replace(',', "");
    if digits.starts_with('.') {
        digits.insert(0, '0');
    }
    let value = Decimal::from_str(&digits).ok()?;
    if parens || caps.name("neg").is_some() {
        Some(-value)
    } else {
        Some(value)
    }
}
