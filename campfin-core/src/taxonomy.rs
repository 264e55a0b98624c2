//! Transaction subtype taxonomy: label -> direction.
//!
//! The table is plain data. New subtypes are added by loading a different
//! table, not by touching the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::TaxonomyError;
use crate::record::Direction;

/// ORESTAR reporting guide subtypes that bring money in.
/// "Forgiveen Account Payable" is spelled the way the state's exports spell it.
pub const ORESTAR_INCOME: &[&str] = &[
    "Cash Contribution",
    "In-Kind Contribution",
    "In-Kind Personal Expenditure",
    "Forgiven Personal Expenditures",
    "In-Kind Account Payable",
    "Forgiveen Account Payable",
    "Items Sold at Fair Market Value",
    "Loan Received",
    "Lost or Returned Check",
    "Refunds or Rebates",
    "Miscellaneous Other Receipt",
];

/// ORESTAR reporting guide subtypes that move money out.
pub const ORESTAR_SPENDING: &[&str] = &[
    "Cash Expenditure",
    "Personal Expenditure for Reimbursement",
    "Account Payable",
    "Loan Payment",
    "Return or Refund of Contribution",
    "Miscellaneous Other Disbursement",
];

/// Label lookup table. Labels are matched exactly (case and whitespace).
///
/// Serializes as a plain `label -> direction` map. Deserializing goes through
/// `from_entries`, so an empty label is rejected there too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Direction>",
    into = "BTreeMap<String, Direction>"
)]
pub struct Taxonomy {
    entries: BTreeMap<String, Direction>,
}

impl Taxonomy {
    /// The built-in ORESTAR table.
    pub fn orestar() -> Self {
        let entries = ORESTAR_INCOME
            .iter()
            .map(|l| (l.to_string(), Direction::Income))
            .chain(
                ORESTAR_SPENDING
                    .iter()
                    .map(|l| (l.to_string(), Direction::Spending)),
            )
            .collect();
        Self { entries }
    }

    /// Build a table from (label, direction) pairs. Duplicate labels are rejected.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (label, direction) in entries {
            let label = label.into();
            if label.is_empty() {
                return Err(TaxonomyError::EmptyLabel);
            }
            if map.contains_key(&label) {
                return Err(TaxonomyError::DuplicateLabel(label));
            }
            map.insert(label, direction);
        }
        Ok(Self { entries: map })
    }

    /// Direction for `category`, or `None` when the label is not tracked.
    pub fn classify(&self, category: &str) -> Option<Direction> {
        self.entries.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Labels for one direction, in label order.
    pub fn labels(&self, direction: Direction) -> Vec<&str> {
        self.iter()
            .filter(|(_, d)| *d == direction)
            .map(|(l, _)| l)
            .collect()
    }
}

impl TryFrom<BTreeMap<String, Direction>> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(entries: BTreeMap<String, Direction>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Taxonomy> for BTreeMap<String, Direction> {
    fn from(taxonomy: Taxonomy) -> Self {
        taxonomy.entries
    }
}
