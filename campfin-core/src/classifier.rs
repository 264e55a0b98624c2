//! Record classifier: turns a raw ledger row into a signed, directed record
//! or flags it as untracked.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::record::{Direction, TransactionRecord};
use crate::taxonomy::Taxonomy;

/// A record whose category the taxonomy knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub date: NaiveDate,
    pub category: String,
    pub direction: Direction,
    /// Magnitude, always >= 0
    pub amount: Decimal,
    /// `direction.sign() * amount`
    pub signed_amount: Decimal,
    /// Carried through for error messages
    pub locator: String,
}

/// A record whose category the taxonomy does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntrackedRecord {
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Tracked(ClassifiedRecord),
    Untracked(UntrackedRecord),
}

/// Occurrence count per unrecognized label. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UntrackedCounter {
    counts: BTreeMap<String, usize>,
}

impl UntrackedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the count for `category`; returns the new count.
    pub fn record(&mut self, category: &str) -> usize {
        let n = self.counts.entry(category.to_string()).or_insert(0);
        *n += 1;
        *n
    }

    pub fn get(&self, category: &str) -> usize {
        self.counts.get(category).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total untracked records across all labels.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn merge(&mut self, other: &UntrackedCounter) {
        for (label, n) in &other.counts {
            *self.counts.entry(label.clone()).or_insert(0) += n;
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }
}

/// Classify one record against `taxonomy`.
///
/// Negative amounts fail with `MalformedRecord` before the
/// taxonomy is consulted. Unknown labels bump `untracked` and are returned as
/// `Classification::Untracked`.
pub fn classify_record(
    record: &TransactionRecord,
    taxonomy: &Taxonomy,
    untracked: &mut UntrackedCounter,
) -> Result<Classification, LedgerError> {
    if record.amount < Decimal::ZERO {
        return Err(LedgerError::malformed(record));
    }

    match taxonomy.classify(&record.category) {
        Some(direction) => Ok(Classification::Tracked(ClassifiedRecord {
            date: record.date,
            category: record.category.clone(),
            direction,
            amount: record.amount,
            signed_amount: direction.sign() * record.amount,
            locator: record.locator(),
        })),
        None => {
            let seen = untracked.record(&record.category);
            if seen == 1 {
                tracing::debug!(category = %record.category, "untracked transaction subtype");
            }
            Ok(Classification::Untracked(UntrackedRecord {
                category: record.category.clone(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d0() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_income_is_positive() {
        let tax = Taxonomy::orestar();
        let mut untracked = UntrackedCounter::new();
        let rec = TransactionRecord::new(d0(), "Cash Contribution", dec!(500));
        match classify_record(&rec, &tax, &mut untracked).unwrap() {
            Classification::Tracked(c) => {
                assert_eq!(c.direction, Direction::Income);
                assert_eq!(c.signed_amount, dec!(500));
                assert_eq!(c.amount, dec!(500));
            }
            other => panic!("expected tracked, got {other:?}"),
        }
        assert!(untracked.is_empty());
    }

    #[test]
    fn test_spending_is_negative() {
        let tax = Taxonomy::orestar();
        let mut untracked = UntrackedCounter::new();
        let rec = TransactionRecord::new(d0(), "Cash Expenditure", dec!(200));
        let Classification::Tracked(c) = classify_record(&rec, &tax, &mut untracked).unwrap()
        else {
            panic!("expected tracked");
        };
        assert_eq!(c.direction, Direction::Spending);
        assert_eq!(c.signed_amount, dec!(-200));
        assert_eq!(c.amount, dec!(200));
    }

    #[test]
    fn test_unknown_category_is_counted() {
        let tax = Taxonomy::orestar();
        let mut untracked = UntrackedCounter::new();
        let rec = TransactionRecord::new(d0(), "Bizarre Type", dec!(50));
        for _ in 0..3 {
            let out = classify_record(&rec, &tax, &mut untracked).unwrap();
            assert_eq!(
                out,
                Classification::Untracked(UntrackedRecord {
                    category: "Bizarre Type".to_string()
                })
            );
        }
        assert_eq!(untracked.get("Bizarre Type"), 3);
        assert_eq!(untracked.total(), 3);
    }

    #[test]
    fn test_negative_amount_is_malformed() {
        let tax = Taxonomy::orestar();
        let mut untracked = UntrackedCounter::new();
        let rec = TransactionRecord::new(d0(), "Cash Contribution", dec!(-5)).with_row(7);
        let err = classify_record(&rec, &tax, &mut untracked).unwrap_err();
        match err {
            LedgerError::MalformedRecord { locator, amount, category, .. } => {
                assert_eq!(locator, "row 7");
                assert_eq!(amount, dec!(-5));
                assert_eq!(category, "Cash Contribution");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_is_malformed_even_when_untracked() {
        let tax = Taxonomy::orestar();
        let mut untracked = UntrackedCounter::new();
        let rec = TransactionRecord::new(d0(), "Bizarre Type", dec!(-0.01));
        assert!(matches!(
            classify_record(&rec, &tax, &mut untracked),
            Err(LedgerError::MalformedRecord { .. })
        ));
        assert!(untracked.is_empty());
    }

    #[test]
    fn test_untracked_merge() {
        let mut a = UntrackedCounter::new();
        a.record("X");
        let mut b = UntrackedCounter::new();
        b.record("X");
        b.record("Y");
        a.merge(&b);
        assert_eq!(a.get("X"), 2);
        assert_eq!(a.get("Y"), 1);
    }
}
