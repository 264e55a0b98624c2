//! Share of income per category.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

use crate::engine::CategoryTotals;
use crate::error::LedgerError;

/// Category label -> percent of total funds received (0..=100).
pub type CategoryPercentages = BTreeMap<String, f64>;

/// Percent of `total_funds_received` contributed by each income category.
///
/// Shares are divided out in decimal and only converted to `f64` at the end.
/// Fails with `NoIncomeRecorded` when nothing was received, instead of
/// handing back NaN or infinite shares.
pub fn build_summary(
    category_totals: &CategoryTotals,
    total_funds_received: Decimal,
) -> Result<CategoryPercentages, LedgerError> {
    if total_funds_received <= Decimal::ZERO {
        return Err(LedgerError::NoIncomeRecorded);
    }

    Ok(category_totals
        .iter()
        .map(|(label, total)| {
            let share = Decimal::ONE_HUNDRED * total / total_funds_received;
            (label.clone(), share.to_f64().unwrap_or_default())
        })
        .collect())
}

/// Percentages sorted by share, largest first. Ties keep label order.
pub fn ranked(percentages: &CategoryPercentages) -> Vec<(&str, f64)> {
    let mut out: Vec<(&str, f64)> = percentages.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1));
    out
}
