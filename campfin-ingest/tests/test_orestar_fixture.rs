use campfin_core::{LedgerRun, Taxonomy};
use campfin_ingest::read_orestar_csv;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("orestar_sample.csv")
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_read_fixture() {
    let txns = read_orestar_csv(fixture_path()).expect("should parse fixture");
    assert_eq!(txns.len(), 7);

    let first = &txns[0];
    assert_eq!(first.date, ymd(2024, 1, 3));
    assert_eq!(first.category, "Cash Contribution");
    assert_eq!(first.amount, dec!(250));
    assert_eq!(first.id.as_deref(), Some("2801001"));

    let loan = txns.iter().find(|t| t.category == "Loan Received").unwrap();
    assert_eq!(loan.amount, dec!(1000));
}

/// Whole pipeline over a realistic export.
#[test]
fn test_fixture_through_engine() {
    let txns = read_orestar_csv(fixture_path()).unwrap();
    let tax = Taxonomy::orestar();
    let report = LedgerRun::new(&tax).process(&txns).unwrap();

    // Jan 3 through Jan 7 inclusive
    assert_eq!(report.series.len(), 5);
    assert_eq!(report.series.day(ymd(2024, 1, 3)), Some((dec!(250), dec!(120.5))));
    assert_eq!(report.series.day(ymd(2024, 1, 6)), Some((dec!(0), dec!(0))));
    assert_eq!(report.series.day(ymd(2024, 1, 7)), Some((dec!(50), dec!(200))));

    assert_eq!(report.totals.total_funds_received, dec!(1345));
    assert_eq!(report.totals.cash_on_hand, dec!(1024.5));
    assert_eq!(report.untracked.get("Nonpartisan Transfer"), 1);

    let pct = report.percentages().unwrap();
    assert!((pct["Cash Contribution"] - 100.0 * 300.0 / 1345.0).abs() < 1e-9);
    let sum: f64 = pct.values().sum();
    assert!((sum - 100.0).abs() < 1e-9);
}
