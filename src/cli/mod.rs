//! Command-line parsing for the stock runout estimator.
//!
//! Argument parsing and command dispatch stay separate from the engine. Engine
//! options are all optional here: unset flags fall back to the environment and
//! then to `EngineConfig::default()` (see `app::engine_config_from_args`).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "runout", version, about = "SKU stock runout estimator")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the runout date for one SKU and print the forecast.
    Forecast(ForecastArgs),
    /// Estimate runout dates for many SKUs concurrently.
    Batch(BatchArgs),
    /// Generate synthetic order and stock CSVs.
    Simulate(SimulateArgs),
    /// Print a previously exported runout JSON.
    Show(ShowArgs),
}

/// Engine options shared by `forecast` and `batch`.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Forecast horizon per iteration, in days.
    #[arg(short = 'p', long, default_value_t = 30)]
    pub period: usize,

    /// Maximum concurrent trend fits.
    #[arg(long)]
    pub pool_capacity: Option<usize>,

    /// Maximum forecast iterations per SKU.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Maximum total forecast horizon per SKU, in days.
    #[arg(long)]
    pub max_horizon_days: Option<usize>,

    /// Wall-clock budget per SKU, in milliseconds.
    #[arg(long)]
    pub time_budget_ms: Option<u64>,

    /// Floor fed-back forecasts at zero before refitting.
    #[arg(long)]
    pub clamp_feedback: bool,

    /// Ignore zero-demand days before the first sale.
    #[arg(long)]
    pub trim_leading_zeros: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Orders CSV (`sku,date,quantity`).
    #[arg(long, value_name = "CSV")]
    pub orders: PathBuf,

    /// SKU to forecast.
    #[arg(short, long)]
    pub sku: String,

    /// Current stock level. Overrides `--stock-file`.
    #[arg(long)]
    pub stock: Option<f64>,

    /// Stock CSV (`sku,on_hand`).
    #[arg(long, value_name = "CSV")]
    pub stock_file: Option<PathBuf>,

    /// Maximum forecast rows to print.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Export the result to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Export the forecast table to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Orders CSV (`sku,date,quantity`).
    #[arg(long, value_name = "CSV")]
    pub orders: PathBuf,

    /// Stock CSV (`sku,on_hand`).
    #[arg(long, value_name = "CSV")]
    pub stock_file: PathBuf,

    /// Only these SKUs (comma-separated). Defaults to every SKU in either file.
    #[arg(long, value_delimiter = ',')]
    pub skus: Vec<String>,

    /// Write one `<sku>.json` per successful SKU into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Output orders CSV.
    #[arg(long, value_name = "CSV")]
    pub out_orders: PathBuf,

    /// Output stock CSV.
    #[arg(long, value_name = "CSV")]
    pub out_stock: PathBuf,

    /// Number of SKUs.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub skus: usize,

    /// Days of history per SKU.
    #[arg(long, default_value_t = 90)]
    pub days: usize,

    /// First history date.
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Typical daily demand.
    #[arg(long, default_value_t = 20.0)]
    pub base_demand: f64,

    /// Maximum absolute daily drift in demand.
    #[arg(long, default_value_t = 0.3)]
    pub trend_max: f64,

    /// Standard deviation of daily noise.
    #[arg(long, default_value_t = 4.0)]
    pub noise_sd: f64,

    /// Stock level, in days of recent average demand.
    #[arg(long, default_value_t = 60.0)]
    pub stock_days: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for printing a saved result.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Runout JSON produced by `runout forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub json: PathBuf,

    /// Maximum forecast rows to print.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_flags_are_optional() {
        let cli = Cli::parse_from(["runout", "forecast", "--orders", "o.csv", "--sku", "A", "--stock", "5"]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.engine.period, 30);
        assert_eq!(args.engine.pool_capacity, None);
        assert_eq!(args.stock, Some(5.0));
    }

    #[test]
    fn batch_splits_sku_list() {
        let cli = Cli::parse_from([
            "runout", "-vv", "batch", "--orders", "o.csv", "--stock-file", "s.csv", "--skus", "A,B",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Batch(args) = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(args.skus, vec!["A".to_string(), "B".to_string()]);
    }
}
