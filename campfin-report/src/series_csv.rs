//! Daily series as CSV: the data behind an "income and spending per day" chart.

use anyhow::{Context, Result, bail};
use campfin_core::DailySeries;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: String,
    income: f64,
    spending: f64,
}

/// Write `date,income,spending` rows, one per day in the series.
///
/// Values are divided by `scale`; 1000 gives thousands of dollars. The
/// output is for charting, so it is written as floating point.
pub fn write_series_csv<W: Write>(writer: W, series: &DailySeries, scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        bail!("scale must be a positive number, got {scale}");
    }

    let mut wtr = csv::Writer::from_writer(writer);
    for (date, income, spending) in series.rows() {
        wtr.serialize(SeriesRow {
            date: date.format("%Y-%m-%d").to_string(),
            income: income.to_f64().unwrap_or_default() / scale,
            spending: spending.to_f64().unwrap_or_default() / scale,
        })
        .with_context(|| format!("writing series row for {date}"))?;
    }
    wtr.flush().context("flushing series csv")?;
    Ok(())
}

/// Convenience wrapper returning the CSV as a string.
pub fn series_csv_string(series: &DailySeries, scale: f64) -> Result<String> {
    let mut buf = Vec::new();
    write_series_csv(&mut buf, series, scale)?;
    String::from_utf8(buf).context("series csv is not utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use campfin_core::{LedgerRun, Taxonomy, TransactionRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series() -> DailySeries {
        let d = |n| NaiveDate::from_ymd_opt(2024, 1, n).unwrap();
        let tax = Taxonomy::orestar();
        let records = vec![
            TransactionRecord::new(d(1), "Cash Contribution", dec!(1500)),
            TransactionRecord::new(d(3), "Cash Expenditure", dec!(250)),
        ];
        LedgerRun::new(&tax).process(&records).unwrap().series
    }

    #[test]
    fn test_series_csv_unscaled() {
        let text = series_csv_string(&series(), 1.0).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "date,income,spending");
        assert_eq!(lines[1], "2024-01-01,1500.0,0.0");
        assert_eq!(lines[2], "2024-01-02,0.0,0.0");
        assert_eq!(lines[3], "2024-01-03,0.0,250.0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_series_csv_thousands() {
        let text = series_csv_string(&series(), 1000.0).unwrap();
        assert!(text.contains("2024-01-01,1.5,0.0"));
        assert!(text.contains("2024-01-03,0.0,0.25"));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(series_csv_string(&series(), 0.0).is_err());
        assert!(series_csv_string(&series(), -2.0).is_err());
    }
}
