//! Blockchain fee metrics dashboard
//!
//! Fetches metric tables from a data provider (Dune Analytics or an
//! object-store export), runs the filter/aggregate/pivot pipeline, and
//! renders CSV reports plus a console summary.

mod config;
mod constants;
mod dune;
mod provider;
mod reports;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use fee_metrics::{
    FilterCriteria, RawRow, filter_series, normalize, pivot_by_period, shares_by_period,
    totals_by_category,
};

use config::{Config, FileConfig};
use dune::DuneClient;
use provider::{DataProvider, Dataset, DatasetKind};
use reports::ReportData;
use store::StoreClient;

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "fee-dashboard")]
#[command(about = "Blockchain transaction-fee and throughput metrics dashboard")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Metric table to fetch
    #[arg(value_enum, default_value_t = DatasetKind::Fees)]
    dataset: DatasetKind,

    /// Data source backend (chosen once at startup)
    #[arg(long, value_enum, default_value_t = Source::Dune)]
    source: Source,

    /// Start of the inclusive date range, YYYY-MM-DD (default: first period in the data)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// End of the inclusive date range, YYYY-MM-DD (default: last period in the data)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Category labels to keep, comma-separated (default: all present)
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// Number of headline categories to show
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,
}

/// Data source backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Latest results of the saved Dune queries
    Dune,
    /// JSON/CSV exports in the object-store bucket
    Store,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List metric exports available in the object-store bucket
    ListObjects {
        /// Only show keys under this prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

/// Load config file or exit with helpful message
fn load_config_file() -> Result<FileConfig> {
    let path = std::path::Path::new(CONFIG_FILE);

    if !path.exists() {
        anyhow::bail!(
            "Config file '{}' not found.\n\n\
            To get started:\n\
            1. Copy config.toml.example to config.toml\n\
            2. Fill in your API keys and bucket settings\n\n\
            See config.toml.example for the required format.",
            CONFIG_FILE
        );
    }

    FileConfig::load(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::fs::create_dir_all(&args.output_dir)?;

    let config = Config::from_file(load_config_file()?)?;

    if let Some(command) = args.command {
        return handle_command(command, &config).await;
    }

    let dataset = Dataset::from_config(args.dataset, &config);

    println!("Fetching {}...", dataset.kind.label());
    let rows = match args.source {
        Source::Dune => {
            let provider = DuneClient::new(config.dune_api_key.clone());
            fetch_or_empty(&provider, &dataset).await
        }
        Source::Store => {
            let provider = StoreClient::new(&config.store);
            fetch_or_empty(&provider, &dataset).await
        }
    };

    run_pipeline(&rows, &dataset, &args)
}

/// Handle non-report subcommands
async fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::ListObjects { prefix } => {
            let store = StoreClient::new(&config.store);
            let keys = store.list(&prefix).await?;

            if keys.is_empty() {
                println!("No objects found in bucket '{}'.", config.store.bucket);
            } else {
                for key in &keys {
                    println!("  {}", key);
                }
                println!("\n{} object(s)", keys.len());
            }
            Ok(())
        }
    }
}

/// Fetch raw rows, degrading any provider failure to an empty dataset.
///
/// Upstream failures (missing object, access denied, failed query, malformed
/// payload) surface as "no data available" and the pipeline then behaves
/// exactly as it does for an empty filtered result.
async fn fetch_or_empty<P: DataProvider>(provider: &P, dataset: &Dataset) -> Vec<RawRow> {
    match provider.fetch(dataset).await {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("  WARNING: {:#}", e);
            eprintln!("  No data available; rendering empty reports");
            Vec::new()
        }
    }
}

/// Run Filter -> Aggregation -> Shaping over the fetched rows and render
/// every report
fn run_pipeline(rows: &[RawRow], dataset: &Dataset, args: &Args) -> Result<()> {
    // A schema failure is terminal for the dataset: no partial reports
    let series = normalize(rows, &dataset.schema)
        .with_context(|| format!("{} failed normalization", dataset.kind.label()))?;

    // Defaults cover the entire range and every category; CLI flags narrow
    // them per interaction
    let filtered = match FilterCriteria::covering(&series) {
        Some(mut criteria) => {
            if let Some(start) = args.start_date {
                criteria.start = start;
            }
            if let Some(end) = args.end_date {
                criteria.end = end;
            }
            if let Some(categories) = &args.categories {
                criteria.categories = categories.iter().cloned().collect();
            }
            filter_series(&series, &criteria)
        }
        None => Vec::new(),
    };

    let totals = totals_by_category(&filtered);
    let shares = shares_by_period(&filtered);
    let pivot = pivot_by_period(&filtered);

    let data = ReportData {
        kind: dataset.kind,
        granularity: dataset.schema.granularity,
        filtered: &filtered,
        totals: &totals,
        shares: &shares,
        pivot: &pivot,
    };

    println!("\nGenerating reports...");
    reports::generate_all_reports(&args.output_dir, &data)?;

    reports::print_summary(&data, args.top);

    Ok(())
}
