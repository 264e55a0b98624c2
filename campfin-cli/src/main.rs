use anyhow::{Context, Result, bail};
use campfin_core::{DateSpan, ErrorPolicy, LedgerReport, LedgerRun, Taxonomy};
use campfin_ingest::{load_taxonomy, read_orestar_csv, taxonomy_to_toml};
use campfin_report::{ReportDocument, render_summary, write_series_csv};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

use config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "campfin",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CAMPFIN_BUILD_SHA"), ")"),
    about = "Campaign-finance ledger classification and daily income/spending series"
)]
struct Cli {
    /// More log output on stderr (default info, -v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify and aggregate a ledger, then print the summary
    Analyze {
        #[command(flatten)]
        run: RunArgs,

        /// Output format (default from config: text)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Also write the daily series CSV here
        #[arg(long)]
        series_out: Option<PathBuf>,
    },

    /// Write the daily income/spending series as CSV
    Series {
        #[command(flatten)]
        run: RunArgs,

        /// Divide values by this (1000 = thousands of dollars)
        #[arg(long)]
        scale: Option<f64>,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Inspect the transaction subtype taxonomy
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommand,
    },

    /// Manage ~/.campfin/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// ORESTAR transaction export (CSV)
    #[arg(long)]
    ledger: PathBuf,

    /// Taxonomy table (.toml or .csv) instead of the built-in one
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// abort | skip
    #[arg(long)]
    policy: Option<ErrorPolicy>,

    /// Leave the latest ledger date out of the series
    #[arg(long)]
    exclusive_end: bool,

    /// First day of the reporting window (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the reporting window (YYYY-MM-DD; excluded with --exclusive-end)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Ingest on this many threads
    #[arg(long)]
    shards: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum TaxonomyCommand {
    /// Print the active taxonomy as TOML
    Show {
        /// Taxonomy table to show instead of the configured one
        #[arg(long)]
        taxonomy: Option<PathBuf>,
    },
    /// Write the built-in ORESTAR table to a file for editing
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config()?;

    match cli.command {
        Command::Analyze {
            run,
            format,
            series_out,
        } => {
            let report = run_ledger(&run, &cfg)?;

            if let Some(path) = series_out {
                write_series_file(&path, &report, cfg.report.scale)?;
            }

            match format.unwrap_or(cfg.report.format) {
                OutputFormat::Text => {
                    print!("{}", render_summary(&report, &report.percentages()));
                }
                OutputFormat::Json => {
                    println!("{}", ReportDocument::from_report(&report).to_json_pretty()?);
                }
            }
        }

        Command::Series { run, scale, out } => {
            let report = run_ledger(&run, &cfg)?;
            let scale = scale.unwrap_or(cfg.report.scale);
            match out {
                Some(path) => write_series_file(&path, &report, scale)?,
                None => {
                    let stdout = std::io::stdout();
                    write_series_csv(stdout.lock(), &report.series, scale)?;
                }
            }
        }

        Command::Taxonomy { command } => match command {
            TaxonomyCommand::Show { taxonomy } => {
                let tax = resolve_taxonomy(taxonomy.as_deref(), &cfg)?;
                print!("{}", taxonomy_to_toml(&tax).context("render taxonomy")?);
            }
            TaxonomyCommand::Export { out } => {
                let text = taxonomy_to_toml(&Taxonomy::orestar()).context("render taxonomy")?;
                fs::write(&out, text).with_context(|| format!("write {}", out.display()))?;
                println!("Wrote {}", out.display());
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// Filter used when `RUST_LOG` is unset.
fn default_log_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("campfin={level},campfin_core={level},campfin_ingest={level},campfin_report={level}")
}

fn init_tracing(verbose: u8) {
    let default = default_log_filter(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_taxonomy(flag: Option<&Path>, cfg: &Config) -> Result<Taxonomy> {
    match flag.or(cfg.taxonomy.path.as_deref()) {
        Some(p) => load_taxonomy(p).with_context(|| format!("loading taxonomy {}", p.display())),
        None => Ok(Taxonomy::orestar()),
    }
}

fn run_ledger(args: &RunArgs, cfg: &Config) -> Result<LedgerReport> {
    if !args.ledger.exists() {
        bail!("ledger not found: {} (pass --ledger <path>)", args.ledger.display());
    }

    let taxonomy = resolve_taxonomy(args.taxonomy.as_deref(), cfg)?;
    let records = read_orestar_csv(&args.ledger)
        .with_context(|| format!("parsing {}", args.ledger.display()))?;

    let end_inclusive = cfg.engine.end_inclusive && !args.exclusive_end;
    let mut run = LedgerRun::new(&taxonomy)
        .policy(args.policy.unwrap_or(cfg.engine.policy))
        .end_inclusive(end_inclusive);

    if args.from.is_some() || args.to.is_some() {
        let derived = run.span_for(&records).context("computing ledger date span")?;
        let window = DateSpan::new(
            args.from.unwrap_or(derived.start),
            args.to.unwrap_or(derived.end),
            end_inclusive,
        );
        if window.start > window.end {
            bail!("--from {} is after --to {}", window.start, window.end);
        }
        run = run.window(window);
    }

    let shards = args.shards.unwrap_or(cfg.engine.shards);
    let report = run
        .process_sharded(&records, shards)
        .with_context(|| format!("processing {}", args.ledger.display()))?;

    if !report.rejected.is_empty() {
        tracing::warn!(rejected = report.rejected.len(), "some records were skipped");
    }
    Ok(report)
}

fn write_series_file(path: &Path, report: &LedgerReport, scale: f64) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_series_csv(&mut file, &report.series, scale)?;
    file.flush().with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), days = report.series.len(), "wrote series");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    const LEDGER: &str = "\
Tran Id,Tran Date,Sub Type,Amount
1,01/02/2024,Cash Contribution,100.00
2,01/03/2024,Cash Expenditure,40.00
3,01/05/2024,Loan Received,60.00
";

    fn run_args(ledger: PathBuf) -> RunArgs {
        RunArgs {
            ledger,
            taxonomy: None,
            policy: None,
            exclusive_end: false,
            from: None,
            to: None,
            shards: None,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from([
            "campfin", "-vv", "analyze", "--ledger", "x.csv", "--policy", "skip", "--from",
            "2024-01-01", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Analyze { run, format, .. } => {
                assert_eq!(run.policy, Some(ErrorPolicy::Skip));
                assert_eq!(run.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_default_log_filter_levels() {
        assert!(default_log_filter(0).starts_with("campfin=info,"));
        assert!(default_log_filter(0).ends_with("campfin_report=info"));
        assert!(default_log_filter(1).contains("campfin_core=debug"));
        assert!(default_log_filter(2).contains("campfin_ingest=trace"));
        assert_eq!(default_log_filter(5), default_log_filter(2));
        assert!(default_log_filter(0).parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_run_ledger_with_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, LEDGER).unwrap();

        let report = run_ledger(&run_args(path.clone()), &Config::default()).unwrap();
        assert_eq!(report.series.len(), 4);
        assert_eq!(report.totals.cash_on_hand, dec!(120));

        let mut args = run_args(path);
        args.to = NaiveDate::from_ymd_opt(2024, 1, 3);
        assert!(run_ledger(&args, &Config::default()).is_err());

        args.policy = Some(ErrorPolicy::Skip);
        args.shards = Some(2);
        let report = run_ledger(&args, &Config::default()).unwrap();
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.totals.total_funds_received, dec!(100));
    }

    #[test]
    fn test_run_ledger_missing_file() {
        let err = run_ledger(&run_args(PathBuf::from("/nonexistent/ledger.csv")), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("ledger not found"));
    }

    #[test]
    fn test_write_series_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.csv");
        fs::write(&ledger, LEDGER).unwrap();
        let report = run_ledger(&run_args(ledger), &Config::default()).unwrap();

        let out = dir.path().join("series.csv");
        write_series_file(&out, &report, 1.0).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("date,income,spending\n2024-01-02,100.0,0.0"));
    }
}
