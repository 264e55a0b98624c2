//! Plain-text run summary for terminals.

use campfin_core::{CategoryPercentages, LedgerError, LedgerReport, ranked};
use std::fmt::Write;

/// Render a human-readable summary of `report`.
///
/// `percentages` is passed in as computed by the caller so a
/// `NoIncomeRecorded` outcome is shown as such rather than as zeros.
pub fn render_summary(
    report: &LedgerReport,
    percentages: &Result<CategoryPercentages, LedgerError>,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, report, percentages);
    out
}

fn write_summary(
    out: &mut String,
    report: &LedgerReport,
    percentages: &Result<CategoryPercentages, LedgerError>,
) -> std::fmt::Result {
    let span = report.span();
    writeln!(out, "# Campaign ledger summary\n")?;
    writeln!(out, "Span: {} ({} days)", span, report.series.len())?;
    writeln!(
        out,
        "Records: {} read, {} aggregated, {} untracked, {} rejected\n",
        report.record_count,
        report.ingested_count,
        report.untracked.total(),
        report.rejected.len()
    )?;

    writeln!(out, "Cash on hand:         ${:>14.2}", report.totals.cash_on_hand)?;
    writeln!(out, "Total funds received: ${:>14.2}", report.totals.total_funds_received)?;
    writeln!(out, "Total spending:       ${:>14.2}\n", report.total_spending())?;

    writeln!(out, "## Funding composition\n")?;
    match percentages {
        Ok(pct) if pct.is_empty() => writeln!(out, "(no income categories)")?,
        Ok(pct) => {
            for (label, share) in ranked(pct) {
                let amount = report.category_totals.get(label).copied().unwrap_or_default();
                writeln!(out, "{share:>6.2}%  ${amount:>12.2}  {label}")?;
            }
        }
        Err(LedgerError::NoIncomeRecorded) => {
            writeln!(out, "No income recorded; funding shares are not available.")?
        }
        Err(e) => writeln!(out, "Funding shares unavailable: {e}")?,
    }

    if !report.untracked.is_empty() {
        writeln!(out, "\n## Untracked subtypes\n")?;
        for (label, count) in report.untracked.iter() {
            writeln!(out, "{count:>6}  {label}")?;
        }
    }

    if !report.rejected.is_empty() {
        writeln!(out, "\n## Rejected records\n")?;
        for r in &report.rejected {
            writeln!(out, "- {}", r.reason)?;
        }
    }

    Ok(())
}
