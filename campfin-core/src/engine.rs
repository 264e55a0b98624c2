//! Aggregation engine: folds classified records into a dense daily series
//! plus running totals.
//!
//! All accumulation is exact decimal addition, so the final state does not
//! depend on ingestion order. Two partial aggregates over the same span can be
//! merged elementwise, which is what sharded ingestion relies on.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::ClassifiedRecord;
use crate::error::LedgerError;
use crate::record::Direction;
use crate::time::DateSpan;

/// Per-day income and spending over a `DateSpan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub span: DateSpan,
    pub income_totals: Vec<Decimal>,
    pub spending_totals: Vec<Decimal>,
}

impl DailySeries {
    pub fn new(span: DateSpan) -> Self {
        let n = span.len_days();
        Self {
            span,
            income_totals: vec![Decimal::ZERO; n],
            spending_totals: vec![Decimal::ZERO; n],
        }
    }

    pub fn len(&self) -> usize {
        self.income_totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income_totals.is_empty()
    }

    /// (date, income, spending) per day, in date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Decimal, Decimal)> + '_ {
        self.span
            .days()
            .zip(self.income_totals.iter())
            .zip(self.spending_totals.iter())
            .map(|((d, i), s)| (d, *i, *s))
    }

    /// Income and spending for one day, if the day has a slot.
    pub fn day(&self, date: NaiveDate) -> Option<(Decimal, Decimal)> {
        let idx = self.span.index_of(date)?;
        Some((self.income_totals[idx], self.spending_totals[idx]))
    }

    pub fn total_income(&self) -> Decimal {
        self.income_totals.iter().sum()
    }

    pub fn total_spending(&self) -> Decimal {
        self.spending_totals.iter().sum()
    }
}

/// Campaign-wide running numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// Income minus spending
    pub cash_on_hand: Decimal,
    /// Sum of income, never reduced by spending
    pub total_funds_received: Decimal,
}

/// Income received per category label.
pub type CategoryTotals = BTreeMap<String, Decimal>;

/// One run's accumulator state. Created per run and owned by its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    series: DailySeries,
    totals: RunningTotals,
    category_totals: CategoryTotals,
    ingested: usize,
}

impl Aggregator {
    pub fn new(span: DateSpan) -> Self {
        Self {
            series: DailySeries::new(span),
            totals: RunningTotals::default(),
            category_totals: CategoryTotals::new(),
            ingested: 0,
        }
    }

    pub fn span(&self) -> &DateSpan {
        &self.series.span
    }

    /// Fold one record into the state.
    ///
    /// The day slot is resolved before anything is touched: a record with no
    /// slot fails with `DateOutOfRange` and leaves the state unchanged.
    pub fn ingest(&mut self, record: &ClassifiedRecord) -> Result<(), LedgerError> {
        let span = self.series.span;
        let idx = span
            .index_of(record.date)
            .ok_or_else(|| LedgerError::DateOutOfRange {
                locator: record.locator.clone(),
                date: record.date,
                category: record.category.clone(),
                amount: record.amount,
                span,
            })?;

        self.totals.cash_on_hand += record.signed_amount;

        match record.direction {
            Direction::Income => {
                self.totals.total_funds_received += record.amount;
                *self
                    .category_totals
                    .entry(record.category.clone())
                    .or_insert(Decimal::ZERO) += record.amount;
                self.series.income_totals[idx] += record.amount;
            }
            Direction::Spending => {
                self.series.spending_totals[idx] += record.amount;
            }
        }

        self.ingested += 1;
        Ok(())
    }

    /// Add another partial aggregate over the same span into this one.
    pub fn merge(&mut self, other: Aggregator) -> Result<(), LedgerError> {
        if self.series.span != other.series.span {
            return Err(LedgerError::SpanMismatch {
                left: self.series.span.to_string(),
                right: other.series.span.to_string(),
            });
        }

        for (a, b) in self
            .series
            .income_totals
            .iter_mut()
            .zip(other.series.income_totals)
        {
            *a += b;
        }
        for (a, b) in self
            .series
            .spending_totals
            .iter_mut()
            .zip(other.series.spending_totals)
        {
            *a += b;
        }

        self.totals.cash_on_hand += other.totals.cash_on_hand;
        self.totals.total_funds_received += other.totals.total_funds_received;
        for (label, amount) in other.category_totals {
            *self.category_totals.entry(label).or_insert(Decimal::ZERO) += amount;
        }
        self.ingested += other.ingested;
        Ok(())
    }

    pub fn series(&self) -> &DailySeries {
        &self.series
    }

    pub fn totals(&self) -> RunningTotals {
        self.totals
    }

    pub fn category_totals(&self) -> &CategoryTotals {
        &self.category_totals
    }

    /// Number of records successfully ingested.
    pub fn ingested(&self) -> usize {
        self.ingested
    }

    pub fn into_parts(self) -> (DailySeries, RunningTotals, CategoryTotals) {
        (self.series, self.totals, self.category_totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(
        date: NaiveDate,
        category: &str,
        direction: Direction,
        amount: Decimal,
    ) -> ClassifiedRecord {
        ClassifiedRecord {
            date,
            category: category.to_string(),
            direction,
            amount,
            signed_amount: direction.sign() * amount,
            locator: "test".to_string(),
        }
    }

    fn span() -> DateSpan {
        DateSpan::new(ymd(2024, 1, 1), ymd(2024, 1, 3), true)
    }

    #[test]
    fn test_income_updates_everything() {
        let mut agg = Aggregator::new(span());
        agg.ingest(&rec(ymd(2024, 1, 2), "Cash Contribution", Direction::Income, dec!(100)))
            .unwrap();
        assert_eq!(agg.totals().cash_on_hand, dec!(100));
        assert_eq!(agg.totals().total_funds_received, dec!(100));
        assert_eq!(agg.category_totals()["Cash Contribution"], dec!(100));
        assert_eq!(agg.series().income_totals, vec![dec!(0), dec!(100), dec!(0)]);
        assert_eq!(agg.series().spending_totals, vec![Decimal::ZERO; 3]);
    }

    #[test]
    fn test_spending_only_touches_cash_and_series() {
        let mut agg = Aggregator::new(span());
        agg.ingest(&rec(ymd(2024, 1, 3), "Cash Expenditure", Direction::Spending, dec!(40)))
            .unwrap();
        assert_eq!(agg.totals().cash_on_hand, dec!(-40));
        assert_eq!(agg.totals().total_funds_received, Decimal::ZERO);
        assert!(agg.category_totals().is_empty());
        assert_eq!(agg.series().spending_totals, vec![dec!(0), dec!(0), dec!(40)]);
    }

    #[test]
    fn test_same_day_accumulates() {
        let mut agg = Aggregator::new(span());
        for amount in [dec!(0.1), dec!(0.2), dec!(0.3)] {
            agg.ingest(&rec(ymd(2024, 1, 1), "Loan Received", Direction::Income, amount))
                .unwrap();
        }
        assert_eq!(agg.series().day(ymd(2024, 1, 1)), Some((dec!(0.6), dec!(0))));
        assert_eq!(agg.totals().cash_on_hand, dec!(0.6));
        assert_eq!(agg.ingested(), 3);
    }

    #[test]
    fn test_out_of_range_leaves_state_untouched() {
        let mut agg = Aggregator::new(span());
        let before = agg.clone();
        let err = agg
            .ingest(&rec(ymd(2024, 1, 4), "Cash Contribution", Direction::Income, dec!(5)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::DateOutOfRange { span: s, .. } if s == span()));
        assert_eq!(agg, before);
    }

    #[test]
    fn test_out_of_range_message_shows_span_bounds() {
        let mut agg = Aggregator::new(span());
        let err = agg
            .ingest(&rec(ymd(2024, 1, 4), "Cash Contribution", Direction::Income, dec!(5)))
            .unwrap_err();
        assert!(err.to_string().ends_with("outside the series span 2024-01-01..=2024-01-03"));

        let mut agg = Aggregator::new(DateSpan::new(ymd(2024, 1, 1), ymd(2024, 1, 3), false));
        let err = agg
            .ingest(&rec(ymd(2024, 1, 3), "Cash Contribution", Direction::Income, dec!(5)))
            .unwrap_err();
        assert!(err.to_string().ends_with("outside the series span 2024-01-01..2024-01-03"));
    }

    #[test]
    fn test_merge_is_elementwise() {
        let mut a = Aggregator::new(span());
        let mut b = Aggregator::new(span());
        a.ingest(&rec(ymd(2024, 1, 1), "Cash Contribution", Direction::Income, dec!(10)))
            .unwrap();
        b.ingest(&rec(ymd(2024, 1, 1), "Cash Contribution", Direction::Income, dec!(5)))
            .unwrap();
        b.ingest(&rec(ymd(2024, 1, 2), "Cash Expenditure", Direction::Spending, dec!(3)))
            .unwrap();
        a.merge(b).unwrap();
        assert_eq!(a.series().income_totals, vec![dec!(15), dec!(0), dec!(0)]);
        assert_eq!(a.series().spending_totals, vec![dec!(0), dec!(3), dec!(0)]);
        assert_eq!(a.totals().cash_on_hand, dec!(12));
        assert_eq!(a.category_totals()["Cash Contribution"], dec!(15));
        assert_eq!(a.ingested(), 3);
    }

    #[test]
    fn test_merge_rejects_different_spans() {
        let mut a = Aggregator::new(span());
        let b = Aggregator::new(DateSpan::new(ymd(2024, 1, 1), ymd(2024, 1, 3), false));
        assert!(matches!(a.merge(b), Err(LedgerError::SpanMismatch { .. })));
    }

    #[test]
    fn test_rows_align_dates() {
        let mut agg = Aggregator::new(span());
        agg.ingest(&rec(ymd(2024, 1, 3), "Loan Payment", Direction::Spending, dec!(7)))
            .unwrap();
        let rows: Vec<_> = agg.series().rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], (ymd(2024, 1, 3), dec!(0), dec!(7)));
    }
}
