//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the engine configuration (defaults, `.env`, flags)
//! - owns the fit pool for the lifetime of the command
//! - prints reports and writes optional exports

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, EngineArgs, ForecastArgs, ShowArgs, SimulateArgs};
use crate::data::{SimulationConfig, generate_demand};
use crate::domain::EngineConfig;
use crate::engine::{CancelToken, RunoutEngine};
use crate::error::AppError;
use crate::fit::FitPool;
use crate::io::runout_json::{read_runout_json, to_runout_file, write_runout_json};
use crate::source::{CsvStore, FixedStock, StockSource};

pub mod pipeline;

/// Entry point for the `runout` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Batch(args) => handle_batch(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = engine_config_from_args(&args.engine, env_var)?;

    let stock_file = if args.stock.is_some() { None } else { args.stock_file.as_deref() };
    if args.stock.is_none() && stock_file.is_none() {
        return Err(AppError::new(2, "Provide the stock level with --stock or --stock-file."));
    }
    let store = CsvStore::open(&args.orders, stock_file)?;
    let fixed = args.stock.map(FixedStock);
    let stock: &dyn StockSource = match &fixed {
        Some(fixed) => fixed,
        None => &store,
    };

    let result = with_engine(config, |engine| {
        pipeline::run_forecast(engine, &args.sku, args.engine.period, &store, stock).map_err(AppError::from)
    })?;

    let doc = to_runout_file(&args.sku, &result);
    println!("{}", crate::report::format_runout_summary(&doc));
    println!("{}", crate::report::format_forecast_table(&doc, args.rows));

    if let Some(path) = &args.export_json {
        write_runout_json(path, &args.sku, &result)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_forecast_csv(path, &args.sku, &result)?;
    }

    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = engine_config_from_args(&args.engine, env_var)?;
    let store = CsvStore::open(&args.orders, Some(&args.stock_file))?;
    if !store.row_errors().is_empty() {
        warn!(count = store.row_errors().len(), "input rows skipped");
    }

    let skus = if args.skus.is_empty() { store.skus() } else { args.skus.clone() };
    if skus.is_empty() {
        return Err(AppError::new(2, "No SKUs found in the input files."));
    }

    let outcomes = with_engine(config, |engine| {
        Ok(pipeline::run_batch(
            engine,
            &skus,
            args.engine.period,
            &store,
            &store,
            &CancelToken::new(),
        ))
    })?;

    println!("{}", crate::report::format_batch_table(&outcomes));

    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;
        for o in &outcomes {
            if let Ok(result) = &o.result {
                write_runout_json(&dir.join(export_file_name(&o.sku)), &o.sku, result)?;
            }
        }
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = SimulationConfig {
        skus: args.skus,
        days: args.days,
        start_date: args.start,
        base_demand: args.base_demand,
        trend_max: args.trend_max,
        noise_sd: args.noise_sd,
        stock_days: args.stock_days,
        seed: args.seed,
    };
    let data = generate_demand(&config)?;

    crate::io::export::write_orders_csv(&args.out_orders, &data)?;
    crate::io::export::write_stock_csv(&args.out_stock, &data)?;

    println!(
        "Wrote {} order rows for {} SKU(s) to {} and stock levels to {}",
        data.orders.len(),
        data.stock.len(),
        args.out_orders.display(),
        args.out_stock.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let doc = read_runout_json(&args.json)?;
    println!("{}", crate::report::format_runout_summary(&doc));
    println!("{}", crate::report::format_forecast_table(&doc, args.rows));
    Ok(())
}

/// Build the shared pool, run `f` against an engine, then shut the pool down.
fn with_engine<T>(
    config: EngineConfig,
    f: impl FnOnce(&RunoutEngine) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let pool = Arc::new(FitPool::new(config.pool_capacity)?);
    let engine = RunoutEngine::new(Arc::clone(&pool), config);

    let out = f(&engine);

    drop(engine);
    if let Ok(pool) = Arc::try_unwrap(pool) {
        pool.shutdown();
    }
    out
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve the engine configuration: defaults, then `.env`/environment, then flags.
pub fn engine_config_from_args(
    args: &EngineArgs,
    var: impl Fn(&str) -> Option<String>,
) -> Result<EngineConfig, AppError> {
    dotenvy::dotenv().ok();
    let mut config = EngineConfig::default();

    if let Some(v) = env_number::<usize>(&var, "RUNOUT_POOL_CAPACITY")? {
        config.pool_capacity = v;
    }
    if let Some(v) = env_number::<usize>(&var, "RUNOUT_MAX_ITERATIONS")? {
        config.max_iterations = v;
    }
    if let Some(v) = env_number::<usize>(&var, "RUNOUT_MAX_HORIZON_DAYS")? {
        config.max_horizon_days = v;
    }
    if let Some(ms) = env_number::<u64>(&var, "RUNOUT_TIME_BUDGET_MS")? {
        config.time_budget = Some(Duration::from_millis(ms));
    }

    if let Some(v) = args.pool_capacity {
        config.pool_capacity = v;
    }
    if let Some(v) = args.max_iterations {
        config.max_iterations = v;
    }
    if let Some(v) = args.max_horizon_days {
        config.max_horizon_days = v;
    }
    if let Some(ms) = args.time_budget_ms {
        config.time_budget = Some(Duration::from_millis(ms));
    }
    config.clamp_feedback_at_zero |= args.clamp_feedback;
    config.trim_leading_zeros |= args.trim_leading_zeros;

    if config.pool_capacity == 0 {
        return Err(AppError::new(2, "Pool capacity must be at least 1."));
    }
    if config.max_iterations == 0 {
        return Err(AppError::new(2, "Max iterations must be at least 1."));
    }

    info!(
        pool_capacity = config.pool_capacity,
        max_iterations = config.max_iterations,
        max_horizon_days = config.max_horizon_days,
        time_budget_ms = config.time_budget.map(|d| d.as_millis() as u64),
        clamp_feedback = config.clamp_feedback_at_zero,
        trim_leading_zeros = config.trim_leading_zeros,
        "engine configured"
    );
    Ok(config)
}

fn env_number<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AppError> {
    match var(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::new(2, format!("Invalid {key}: '{raw}' is not a valid number."))),
    }
}

/// `<sku>.json`, with path separators and other awkward characters replaced.
fn export_file_name(sku: &str) -> String {
    let safe: String = sku
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    format!("{safe}.json")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args() -> EngineArgs {
        EngineArgs {
            period: 30,
            pool_capacity: None,
            max_iterations: None,
            max_horizon_days: None,
            time_budget_ms: None,
            clamp_feedback: false,
            trim_leading_zeros: false,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env_or_flags() {
        let config = engine_config_from_args(&args(), vars(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn flags_override_environment() {
        let env = vars(&[("RUNOUT_POOL_CAPACITY", "8"), ("RUNOUT_TIME_BUDGET_MS", "250")]);
        let mut a = args();
        a.pool_capacity = Some(3);
        a.clamp_feedback = true;

        let config = engine_config_from_args(&a, env).unwrap();
        assert_eq!(config.pool_capacity, 3);
        assert_eq!(config.time_budget, Some(Duration::from_millis(250)));
        assert!(config.clamp_feedback_at_zero);
        assert_eq!(config.max_iterations, 24);
    }

    #[test]
    fn bad_environment_values_are_usage_errors() {
        let err = engine_config_from_args(&args(), vars(&[("RUNOUT_MAX_ITERATIONS", "lots")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = engine_config_from_args(&args(), vars(&[("RUNOUT_POOL_CAPACITY", "0")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn export_names_are_filesystem_safe() {
        assert_eq!(export_file_name("SKU-001"), "SKU-001.json");
        assert_eq!(export_file_name("a/b c"), "a_b_c.json");
        assert_eq!(export_file_name("v1.5"), "v1.5.json");
    }
}
