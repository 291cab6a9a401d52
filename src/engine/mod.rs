//! Runout orchestration: the forecast-and-extend loop.
//!
//! One computation runs fit → project → estimate over the known history. When
//! the horizon ends before cumulative demand exceeds the stock level, the
//! forecast is appended to the history as pseudo-observations, the extended
//! history is re-normalized and refit, and the next horizon is projected from
//! its new last day. Forecast and cumulative series from every iteration are
//! concatenated, the running total continuing across iteration boundaries.
//!
//! Iterations of one computation are strictly sequential. Fits run on the
//! shared `FitPool`; everything else runs on the caller's thread.
//!
//! The loop stops at the first of:
//! - a runout date (success)
//! - `max_iterations`, `max_horizon_days` or `time_budget` (`RunoutUndetermined`)
//! - a non-increasing, non-positive demand trend that can never exhaust the
//!   stock (`RunoutUndetermined`, only when feedback is unclamped)
//! - a cancelled `CancelToken` (`Cancelled`)
//!
//! Bounds and cancellation are checked between iterations. The first horizon
//! always runs unless the computation was cancelled before it started. Any
//! error drops the partial forecast: results are all-or-nothing.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::domain::{
    CumulativePoint, EngineConfig, ForecastPoint, Observation, RawObservation, RunoutResult, TrendModel,
};
use crate::error::{RunoutError, UndeterminedBound, format_elapsed};
use crate::fit::FitPool;
use crate::forecast::{first_crossing, project};
use crate::models::predict;
use crate::series::{NormalizeOptions, normalize, parse_observations};
use crate::source::{HistorySource, StockSource};

pub mod cancel;

pub use cancel::CancelToken;

/// Slope/level below which a trend counts as flat-or-falling at zero.
const FLAT_EPSILON: f64 = 1e-9;

/// Computes runout dates against a shared fit pool.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct RunoutEngine {
    pool: Arc<FitPool>,
    config: EngineConfig,
}

impl RunoutEngine {
    pub fn new(pool: Arc<FitPool>, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &FitPool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runout date for `observations` against `current_stock`.
    pub fn compute_runout(
        &self,
        observations: &[Observation],
        period: usize,
        current_stock: f64,
    ) -> Result<RunoutResult, RunoutError> {
        self.compute_runout_with(observations, period, current_stock, &CancelToken::new())
    }

    /// Same as `compute_runout`, from records whose dates are still text.
    pub fn compute_runout_raw(
        &self,
        raw: &[RawObservation],
        period: usize,
        current_stock: f64,
    ) -> Result<RunoutResult, RunoutError> {
        let observations = parse_observations(raw)?;
        self.compute_runout(&observations, period, current_stock)
    }

    /// Fetch a SKU's history and stock level, then compute its runout.
    pub fn compute_for_sku(
        &self,
        sku: &str,
        period: usize,
        history: &dyn HistorySource,
        stock: &dyn StockSource,
        cancel: &CancelToken,
    ) -> Result<RunoutResult, RunoutError> {
        let _span = info_span!("runout", sku).entered();

        let raw = history.history(sku)?;
        let current_stock = stock.on_hand(sku)?;
        let observations = parse_observations(&raw)?;
        self.compute_runout_with(&observations, period, current_stock, cancel)
    }

    /// Run the forecast-and-extend loop.
    pub fn compute_runout_with(
        &self,
        observations: &[Observation],
        period: usize,
        current_stock: f64,
        cancel: &CancelToken,
    ) -> Result<RunoutResult, RunoutError> {
        if period == 0 || period > self.config.max_horizon_days {
            return Err(RunoutError::InvalidPeriod(period));
        }
        if !current_stock.is_finite() || current_stock < 0.0 {
            return Err(RunoutError::InvalidStock(current_stock));
        }
        // Negative values are only legal for fed-back forecasts, never for history.
        if let Some((position, obs)) = observations
            .iter()
            .enumerate()
            .find(|(_, o)| !(o.quantity.is_finite() && o.quantity >= 0.0))
        {
            return Err(RunoutError::InvalidQuantity {
                position,
                value: obs.quantity,
            });
        }

        let opts = NormalizeOptions {
            trim_leading_zeros: self.config.trim_leading_zeros,
        };
        let started = Instant::now();

        let mut history: Vec<Observation> = observations.to_vec();
        let mut forecast: Vec<ForecastPoint> = Vec::new();
        let mut cumulative: Vec<CumulativePoint> = Vec::new();
        let mut running_total = 0.0;
        let mut iterations = 0usize;
        let mut last_observed_date = None;

        loop {
            self.check_bounds(iterations, forecast.len(), period, started, cancel)?;

            let series = normalize(&history, &opts)?;
            let last = *series.last();
            let last_observed = *last_observed_date.get_or_insert(last.date);

            let fit = self.pool.fit(&series)?;
            let projection = project(&fit.model, last.day_index, last.date, period, running_total)?;
            iterations += 1;

            let offset = cumulative.len();
            let crossing = first_crossing(&projection.cumulative, current_stock);
            running_total = projection.closing_total().unwrap_or(running_total);

            debug!(
                iteration = iterations,
                history_days = series.len(),
                horizon_days = offset + period,
                running_total,
                model = fit.model.display_name(),
                slope = fit.model.slope(),
                "horizon projected"
            );

            let feedback: Vec<Observation> = projection
                .forecast
                .iter()
                .map(|p| {
                    let quantity = if self.config.clamp_feedback_at_zero {
                        p.quantity.max(0.0)
                    } else {
                        p.quantity
                    };
                    Observation::new(p.date, quantity)
                })
                .collect();

            forecast.extend(projection.forecast);
            cumulative.extend(projection.cumulative);

            if let Some(i) = crossing {
                let runout_date = cumulative[offset + i].date;
                info!(
                    %runout_date,
                    iterations,
                    horizon_days = forecast.len(),
                    elapsed = %format_elapsed(started.elapsed()),
                    "runout found"
                );
                return Ok(RunoutResult {
                    runout_date,
                    forecast,
                    cumulative,
                    current_stock,
                    period,
                    iterations,
                    last_observed_date: last_observed,
                    final_fit: fit,
                });
            }

            // Unclamped feedback lies on the fitted line, so the refit reproduces
            // it: a line at or below zero and not rising stays there.
            if !self.config.clamp_feedback_at_zero
                && demand_exhausted(&fit.model, last.day_index, period)
            {
                warn!(
                    iterations,
                    running_total, current_stock, "demand trend never exceeds stock"
                );
                return Err(RunoutError::RunoutUndetermined {
                    iterations,
                    horizon_days: forecast.len(),
                    bound: UndeterminedBound::DemandExhausted,
                });
            }

            history.extend(feedback);
        }
    }

    fn check_bounds(
        &self,
        iterations: usize,
        horizon_days: usize,
        period: usize,
        started: Instant,
        cancel: &CancelToken,
    ) -> Result<(), RunoutError> {
        if cancel.is_cancelled() {
            info!(iterations, "runout computation cancelled");
            return Err(RunoutError::Cancelled { iterations });
        }
        if iterations == 0 {
            return Ok(());
        }

        let bound = if iterations >= self.config.max_iterations {
            Some(UndeterminedBound::MaxIterations)
        } else if horizon_days + period > self.config.max_horizon_days {
            Some(UndeterminedBound::MaxHorizonDays)
        } else if self
            .config
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget)
        {
            Some(UndeterminedBound::TimeBudget)
        } else {
            None
        };

        match bound {
            Some(bound) => {
                warn!(iterations, horizon_days, %bound, "runout not found within bounds");
                Err(RunoutError::RunoutUndetermined {
                    iterations,
                    horizon_days,
                    bound,
                })
            }
            None => Ok(()),
        }
    }
}

/// True when the trend is flat or falling and already at or below zero on the
/// first day past the current horizon.
fn demand_exhausted(model: &TrendModel, last_day_index: u32, period: usize) -> bool {
    let next_day = f64::from(last_day_index) + period as f64 + 1.0;
    model.slope() <= FLAT_EPSILON && predict(model, next_day) <= FLAT_EPSILON
}
