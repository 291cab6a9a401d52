//! Shared runout pipeline used by the `forecast` and `batch` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source lookup -> parse -> forecast-and-extend loop -> result
//!
//! The commands then focus on presentation and exports.

use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::domain::RunoutResult;
use crate::engine::{CancelToken, RunoutEngine};
use crate::error::{RunoutError, format_elapsed};
use crate::source::{HistorySource, StockSource};

/// Outcome for one SKU of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub sku: String,
    pub result: Result<RunoutResult, RunoutError>,
}

/// Runout for a single SKU.
pub fn run_forecast(
    engine: &RunoutEngine,
    sku: &str,
    period: usize,
    history: &dyn HistorySource,
    stock: &dyn StockSource,
) -> Result<RunoutResult, RunoutError> {
    engine.compute_for_sku(sku, period, history, stock, &CancelToken::new())
}

/// Runout for every SKU in `skus`, computed concurrently.
///
/// Requests fan out over rayon's global pool; their fits all go through the
/// engine's shared `FitPool`, which bounds how many run at once. Outcomes come
/// back in input order and one SKU failing never affects the others.
pub fn run_batch(
    engine: &RunoutEngine,
    skus: &[String],
    period: usize,
    history: &dyn HistorySource,
    stock: &dyn StockSource,
    cancel: &CancelToken,
) -> Vec<BatchOutcome> {
    let started = Instant::now();

    let outcomes: Vec<BatchOutcome> = skus
        .par_iter()
        .map(|sku| BatchOutcome {
            sku: sku.clone(),
            result: engine.compute_for_sku(sku, period, history, stock, cancel),
        })
        .collect();

    let found = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!(
        skus = outcomes.len(),
        found,
        failed = outcomes.len() - found,
        peak_fits = engine.pool().peak_in_flight(),
        elapsed = %format_elapsed(started.elapsed()),
        "batch finished"
    );

    outcomes
}
