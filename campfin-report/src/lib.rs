//! campfin-report: text summary, daily series CSV and JSON output for ledger runs

pub mod document;
pub mod series_csv;
pub mod summary_text;

pub use document::{DayRow, ReportDocument};
pub use series_csv::{series_csv_string, write_series_csv};
pub use summary_text::render_summary;
