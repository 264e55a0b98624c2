//! JSON report bundle for downstream tools.

use anyhow::{Context, Result};
use campfin_core::{
    CategoryPercentages, CategoryTotals, DateSpan, LedgerReport, RejectedRecord, RunningTotals,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub spending: Decimal,
}

/// Everything a chart or dashboard needs, in one serializable value.
///
/// Money is written as decimal strings ("1300.00"); percentages are numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub span: DateSpan,
    pub days: Vec<DayRow>,
    pub totals: RunningTotals,
    pub total_spending: Decimal,
    pub category_totals: CategoryTotals,
    /// `None` when no income was recorded
    pub category_percentages: Option<CategoryPercentages>,
    pub untracked: BTreeMap<String, usize>,
    pub rejected: Vec<RejectedRecord>,
    pub record_count: usize,
    pub ingested_count: usize,
}

impl ReportDocument {
    pub fn from_report(report: &LedgerReport) -> Self {
        // The only failure here is NoIncomeRecorded, which maps to null.
        let category_percentages = report.percentages().ok();
        Self {
            span: *report.span(),
            days: report
                .series
                .rows()
                .map(|(date, income, spending)| DayRow {
                    date,
                    income,
                    spending,
                })
                .collect(),
            totals: report.totals,
            total_spending: report.total_spending(),
            category_totals: report.category_totals.clone(),
            category_percentages,
            untracked: report.untracked.as_map().clone(),
            rejected: report.rejected.clone(),
            record_count: report.record_count,
            ingested_count: report.ingested_count,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }
}
