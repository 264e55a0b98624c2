//! Ledger record types: one row per financial event.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single ledger row as handed over by the ingestion side.
///
/// `amount` is a magnitude. Whether it adds to or subtracts from the
/// campaign's cash is decided by the taxonomy, never by the sign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Date of the transaction
    pub date: NaiveDate,
    /// Transaction subtype label ("Cash Contribution", "Loan Payment", ...)
    pub category: String,
    /// Non-negative amount in dollars
    pub amount: Decimal,
    /// Source transaction id, when the export carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 1-based row in the source file, for error reporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl TransactionRecord {
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            category: category.into(),
            amount,
            id: None,
            row: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Short human-readable locator: "row 12 (tran 4411)" or "tran 4411".
    pub fn locator(&self) -> String {
        match (&self.row, &self.id) {
            (Some(row), Some(id)) => format!("row {row} (tran {id})"),
            (Some(row), None) => format!("row {row}"),
            (None, Some(id)) => format!("tran {id}"),
            (None, None) => "unlocated record".to_string(),
        }
    }
}

/// Which way money moves for a given transaction subtype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "spending")]
    Spending,
}

impl Direction {
    /// +1 for income, -1 for spending
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Income => Decimal::ONE,
            Direction::Spending => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Income => "income",
            Direction::Spending => "spending",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" | "+1" | "1" => Ok(Direction::Income),
            "spending" | "-1" => Ok(Direction::Spending),
            other => Err(format!("unknown direction '{other}' (expected income or spending)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_locator() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rec = TransactionRecord::new(date, "Cash Contribution", dec!(25));
        assert_eq!(rec.locator(), "unlocated record");
        let rec = rec.with_id("4411").with_row(12);
        assert_eq!(rec.locator(), "row 12 (tran 4411)");
    }

    #[test]
    fn test_direction_parse_and_sign() {
        assert_eq!("Income".parse::<Direction>().unwrap(), Direction::Income);
        assert_eq!("-1".parse::<Direction>().unwrap(), Direction::Spending);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Income.sign(), dec!(1));
        assert_eq!(Direction::Spending.sign(), dec!(-1));
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&Direction::Spending).unwrap();
        assert_eq!(json, "\"spending\"");
    }
}
