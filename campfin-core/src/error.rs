//! Error conditions raised by the classification and aggregation engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::record::TransactionRecord;
use crate::time::DateSpan;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is negative.
    #[error("malformed record at {locator}: {category} on {date} has invalid amount {amount}")]
    MalformedRecord {
        locator: String,
        date: NaiveDate,
        category: String,
        amount: Decimal,
    },

    /// Record date has no slot in the daily series.
    #[error("record at {locator}: {category} on {date} is outside the series span {span}")]
    DateOutOfRange {
        locator: String,
        date: NaiveDate,
        category: String,
        amount: Decimal,
        span: DateSpan,
    },

    /// Percentages were requested but no income was ever recorded.
    #[error("no income recorded; category percentages are undefined")]
    NoIncomeRecorded,

    /// Zero records were supplied, so the date span is undefined.
    #[error("ledger is empty; nothing to aggregate")]
    EmptyLedger,

    /// Two partial aggregates over different spans cannot be merged.
    #[error("cannot merge aggregates over different spans: {left} vs {right}")]
    SpanMismatch { left: String, right: String },
}

impl LedgerError {
    pub(crate) fn malformed(record: &TransactionRecord) -> Self {
        LedgerError::MalformedRecord {
            locator: record.locator(),
            date: record.date,
            category: record.category.clone(),
            amount: record.amount,
        }
    }

    /// True for failures tied to a single record, which the run policy may skip.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            LedgerError::MalformedRecord { .. } | LedgerError::DateOutOfRange { .. }
        )
    }
}

/// Problems building a taxonomy table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("duplicate taxonomy label '{0}'")]
    DuplicateLabel(String),
    #[error("empty taxonomy label")]
    EmptyLabel,
}
