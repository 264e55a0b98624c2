//! Load and export taxonomy tables.
//!
//! Two formats are understood:
//!
//! TOML (default):
//! ```toml
//! [income]
//! labels = ["Cash Contribution", "Loan Received"]
//!
//! [spending]
//! labels = ["Cash Expenditure"]
//! ```
//!
//! CSV (`.csv` extension), header `label,direction`, direction being
//! `income` or `spending`.

use campfin_core::{Direction, Taxonomy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::IngestError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Section {
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    income: Section,
    #[serde(default)]
    spending: Section,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    label: String,
    direction: String,
}

/// Load a taxonomy from disk; format is picked from the extension.
pub fn load_taxonomy(path: impl AsRef<Path>) -> Result<Taxonomy, IngestError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let taxonomy = if is_csv {
        taxonomy_from_csv(&text)?
    } else {
        taxonomy_from_toml(&text)?
    };
    tracing::debug!(path = %path.display(), labels = taxonomy.len(), "loaded taxonomy");
    Ok(taxonomy)
}

pub fn taxonomy_from_toml(text: &str) -> Result<Taxonomy, IngestError> {
    let file: TaxonomyFile = toml::from_str(text)?;
    let entries = file
        .income
        .labels
        .into_iter()
        .map(|l| (l, Direction::Income))
        .chain(
            file.spending
                .labels
                .into_iter()
                .map(|l| (l, Direction::Spending)),
        );
    let taxonomy = Taxonomy::from_entries(entries)?;
    if taxonomy.is_empty() {
        return Err(IngestError::TaxonomyFormat("no labels defined".to_string()));
    }
    Ok(taxonomy)
}

pub fn taxonomy_from_csv(text: &str) -> Result<Taxonomy, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for result in rdr.deserialize::<CsvRow>() {
        let row = result?;
        let direction: Direction = row.direction.parse().map_err(IngestError::TaxonomyFormat)?;
        entries.push((row.label, direction));
    }
    let taxonomy = Taxonomy::from_entries(entries)?;
    if taxonomy.is_empty() {
        return Err(IngestError::TaxonomyFormat("no labels defined".to_string()));
    }
    Ok(taxonomy)
}

/// Render a taxonomy in the TOML layout `load_taxonomy` reads.
pub fn taxonomy_to_toml(taxonomy: &Taxonomy) -> Result<String, toml::ser::Error> {
    let owned = |d| {
        taxonomy
            .labels(d)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    let file = TaxonomyFile {
        income: Section {
            labels: owned(Direction::Income),
        },
        spending: Section {
            labels: owned(Direction::Spending),
        },
    };
    toml::to_string_pretty(&file)
}
