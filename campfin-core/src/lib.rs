//! campfin-core: campaign ledger classification and daily aggregation

pub mod classifier;
pub mod engine;
pub mod error;
pub mod record;
pub mod run;
pub mod summary;
pub mod taxonomy;
pub mod time;

pub use classifier::{
    Classification, ClassifiedRecord, UntrackedCounter, UntrackedRecord, classify_record,
};
pub use engine::{Aggregator, CategoryTotals, DailySeries, RunningTotals};
pub use error::{LedgerError, TaxonomyError};
pub use record::{Direction, TransactionRecord};
pub use run::{ErrorPolicy, LedgerReport, LedgerRun, RejectedRecord, RejectionKind};
pub use summary::{CategoryPercentages, build_summary, ranked};
pub use taxonomy::Taxonomy;
pub use time::DateSpan;

/// Money type used for every amount and total.
pub use rust_decimal::Decimal;
