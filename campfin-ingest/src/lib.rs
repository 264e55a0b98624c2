//! campfin-ingest: ledger export readers and taxonomy table loading.

pub mod orestar;
pub mod taxonomy_file;
pub mod types;

pub use orestar::{parse_tran_date, read_orestar_csv, read_orestar_reader};
pub use taxonomy_file::{load_taxonomy, taxonomy_to_toml};
pub use types::IngestError;
