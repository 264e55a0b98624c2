use campfin_core::TaxonomyError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading a ledger export or a taxonomy table.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no header row with columns {0:?} found")]
    HeaderNotFound(Vec<&'static str>),
    #[error("row {row}: cannot parse date '{value}'")]
    BadDate { row: usize, value: String },
    #[error("row {row}: cannot parse amount '{value}'")]
    BadAmount { row: usize, value: String },
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("taxonomy file: {0}")]
    TaxonomyFormat(String),
    #[error("taxonomy file: {0}")]
    Taxonomy(#[from] TaxonomyError),
    #[error("taxonomy toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Column names in ORESTAR transaction exports.
pub mod columns {
    pub const TRAN_ID: &str = "Tran Id";
    pub const TRAN_DATE: &str = "Tran Date";
    pub const SUB_TYPE: &str = "Sub Type";
    pub const AMOUNT: &str = "Amount";
}
