//! One complete pass over a loaded ledger: classify, aggregate, report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classifier::{Classification, UntrackedCounter, classify_record};
use crate::engine::{Aggregator, CategoryTotals, DailySeries, RunningTotals};
use crate::error::LedgerError;
use crate::record::TransactionRecord;
use crate::summary::{CategoryPercentages, build_summary};
use crate::taxonomy::Taxonomy;
use crate::time::DateSpan;

/// What to do when a single record is malformed or falls outside the span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first bad record.
    #[default]
    Abort,
    /// Keep going; bad records are listed in `LedgerReport::rejected`.
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("unknown error policy '{other}' (expected abort or skip)")),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => f.write_str("abort"),
            ErrorPolicy::Skip => f.write_str("skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    Malformed,
    OutOfRange,
}

/// A record dropped under `ErrorPolicy::Skip`, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub record: TransactionRecord,
    pub kind: RejectionKind,
    pub reason: String,
}

/// Everything a reporting sink needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerReport {
    pub series: DailySeries,
    pub totals: RunningTotals,
    pub category_totals: CategoryTotals,
    pub untracked: UntrackedCounter,
    pub rejected: Vec<RejectedRecord>,
    /// Records supplied to the run
    pub record_count: usize,
    /// Records that reached the aggregator
    pub ingested_count: usize,
}

impl LedgerReport {
    pub fn span(&self) -> &DateSpan {
        &self.series.span
    }

    /// Per-category share of income. `NoIncomeRecorded` when income is zero.
    pub fn percentages(&self) -> Result<CategoryPercentages, LedgerError> {
        build_summary(&self.category_totals, self.totals.total_funds_received)
    }

    /// Total spending across the series.
    pub fn total_spending(&self) -> Decimal {
        self.series.total_spending()
    }
}

/// Configured run over one ledger.
#[derive(Debug, Clone)]
pub struct LedgerRun<'a> {
    taxonomy: &'a Taxonomy,
    policy: ErrorPolicy,
    end_inclusive: bool,
    window: Option<DateSpan>,
}

struct Partial {
    aggregator: Aggregator,
    untracked: UntrackedCounter,
    rejected: Vec<RejectedRecord>,
}

impl<'a> LedgerRun<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self {
            taxonomy,
            policy: ErrorPolicy::default(),
            end_inclusive: true,
            window: None,
        }
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the latest record date gets its own slot (default: yes).
    pub fn end_inclusive(mut self, end_inclusive: bool) -> Self {
        self.end_inclusive = end_inclusive;
        self
    }

    /// Use a fixed reporting window instead of the ledger's own date range.
    pub fn window(mut self, window: DateSpan) -> Self {
        self.window = Some(window);
        self
    }

    /// Span the series will cover for `records`.
    pub fn span_for(&self, records: &[TransactionRecord]) -> Result<DateSpan, LedgerError> {
        if records.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }
        match self.window {
            Some(w) => Ok(w),
            None => DateSpan::covering(records.iter().map(|r| r.date), self.end_inclusive),
        }
    }

    /// Process every record once, sequentially.
    pub fn process(&self, records: &[TransactionRecord]) -> Result<LedgerReport, LedgerError> {
        let span = self.span_for(records)?;
        let partial = self.fold(records, span)?;
        Ok(self.finish(partial, records.len()))
    }

    /// Process records on up to `shards` threads, each with private state,
    /// then merge. Produces the same report as `process`.
    pub fn process_sharded(
        &self,
        records: &[TransactionRecord],
        shards: usize,
    ) -> Result<LedgerReport, LedgerError> {
        let span = self.span_for(records)?;
        let shards = shards.max(1);
        if shards == 1 || records.len() < shards {
            let partial = self.fold(records, span)?;
            return Ok(self.finish(partial, records.len()));
        }

        let chunk = records.len().div_ceil(shards);
        let results: Vec<Result<Partial, LedgerError>> = std::thread::scope(|s| {
            let handles: Vec<_> = records
                .chunks(chunk)
                .map(|part| s.spawn(move || self.fold(part, span)))
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(r) => r,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });

        let mut merged = Partial {
            aggregator: Aggregator::new(span),
            untracked: UntrackedCounter::new(),
            rejected: Vec::new(),
        };
        // Chunks are joined in order, so under Abort the first error reported
        // is the same one a sequential pass would hit.
        for result in results {
            let part = result?;
            merged.aggregator.merge(part.aggregator)?;
            merged.untracked.merge(&part.untracked);
            merged.rejected.extend(part.rejected);
        }
        Ok(self.finish(merged, records.len()))
    }

    fn fold(&self, records: &[TransactionRecord], span: DateSpan) -> Result<Partial, LedgerError> {
        let mut aggregator = Aggregator::new(span);
        let mut untracked = UntrackedCounter::new();
        let mut rejected = Vec::new();

        for record in records {
            let outcome = classify_record(record, self.taxonomy, &mut untracked).and_then(|c| {
                match c {
                    Classification::Tracked(classified) => aggregator.ingest(&classified),
                    Classification::Untracked(_) => Ok(()),
                }
            });

            if let Err(err) = outcome {
                let kind = match &err {
                    LedgerError::MalformedRecord { .. } => RejectionKind::Malformed,
                    LedgerError::DateOutOfRange { .. } => RejectionKind::OutOfRange,
                    _ => return Err(err),
                };
                match self.policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::Skip => {
                        tracing::warn!(record = %record.locator(), error = %err, "skipping record");
                        rejected.push(RejectedRecord {
                            record: record.clone(),
                            kind,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Partial {
            aggregator,
            untracked,
            rejected,
        })
    }

    fn finish(&self, partial: Partial, record_count: usize) -> LedgerReport {
        let ingested_count = partial.aggregator.ingested();
        let (series, totals, category_totals) = partial.aggregator.into_parts();
        tracing::info!(
            span = %series.span,
            records = record_count,
            ingested = ingested_count,
            untracked = partial.untracked.total(),
            rejected = partial.rejected.len(),
            "ledger processed"
        );
        LedgerReport {
            series,
            totals,
            category_totals,
            untracked: partial.untracked,
            rejected: partial.rejected,
            record_count,
            ingested_count,
        }
    }
}
