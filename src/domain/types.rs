//! Shared domain types.
//!
//! Everything here is request-local: created for one runout computation,
//! serialized into a response or export, then dropped.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Quantity sold/consumed on a calendar date.
///
/// Quantities from order history are non-negative. Forecast values fed back
/// into the history as pseudo-observations may be negative, since the linear
/// trend is not floored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, quantity: f64) -> Self {
        Self { date, quantity }
    }
}

/// An observation as handed over by a data source that carries dates as text.
///
/// A missing or unparseable `date` is only detected when the record is turned
/// into an `Observation` by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: Option<String>,
    pub quantity: f64,
}

impl RawObservation {
    pub fn new(date: impl Into<String>, quantity: f64) -> Self {
        Self {
            date: Some(date.into()),
            quantity,
        }
    }
}

/// One point of a normalized series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Whole days since the earliest date in the series.
    pub day_index: u32,
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-sorted, per-day aggregated history with a zero-based day index.
///
/// Only the normalizer builds these, so a `NormalizedSeries` is never empty and
/// its day indices are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    points: Vec<SeriesPoint>,
}

impl NormalizedSeries {
    pub(crate) fn from_sorted(points: Vec<SeriesPoint>) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|w| w[0].day_index < w[1].day_index));
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &SeriesPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &SeriesPoint {
        &self.points[self.points.len() - 1]
    }
}

/// Fitted demand trend: `day_index -> predicted quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrendModel {
    /// `quantity = intercept + slope * day_index`
    Linear { intercept: f64, slope: f64 },
    /// Fallback when the history has a single distinct day: predict the mean.
    Constant { level: f64 },
}

impl TrendModel {
    /// Human-readable label for terminal output.
    pub fn display_name(&self) -> &'static str {
        match self {
            TrendModel::Linear { .. } => "linear",
            TrendModel::Constant { .. } => "constant (mean)",
        }
    }

    pub fn slope(&self) -> f64 {
        match self {
            TrendModel::Linear { slope, .. } => *slope,
            TrendModel::Constant { .. } => 0.0,
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
}

/// A fitted trend plus how well it matched the series it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub model: TrendModel,
    pub quality: FitQuality,
}

/// Predicted quantity for one future date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Running total of predicted quantity up to and including `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub running_total: f64,
}

/// Outcome of one runout computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunoutResult {
    /// First date whose running total strictly exceeds `current_stock`.
    ///
    /// Always present: a computation that finds no crossing within its bounds
    /// returns `RunoutError::RunoutUndetermined` instead of a result.
    pub runout_date: NaiveDate,
    pub forecast: Vec<ForecastPoint>,
    pub cumulative: Vec<CumulativePoint>,
    pub current_stock: f64,
    pub period: usize,
    /// Number of fit/project/estimate cycles that ran.
    pub iterations: usize,
    pub last_observed_date: NaiveDate,
    /// Trend fitted in the final iteration.
    pub final_fit: TrendFit,
}

impl RunoutResult {
    /// Days from the last observed date to the runout date.
    pub fn days_until_runout(&self) -> i64 {
        (self.runout_date - self.last_observed_date).num_days()
    }
}

/// Engine configuration.
///
/// Built from defaults, then `.env`/environment overrides, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Worker pool size; also the system-wide cap on concurrent fits.
    pub pool_capacity: usize,
    /// Maximum fit/project/estimate cycles per request.
    pub max_iterations: usize,
    /// Maximum total forecast days per request.
    pub max_horizon_days: usize,
    /// Optional wall-clock budget per request, checked between iterations.
    pub time_budget: Option<Duration>,
    /// Floor pseudo-observations at zero before feeding them back into the
    /// history. Reported forecasts are never floored.
    pub clamp_feedback_at_zero: bool,
    /// Drop zero-demand days before the first day with positive demand.
    pub trim_leading_zeros: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 100,
            max_iterations: 24,
            max_horizon_days: 3650,
            time_budget: None,
            clamp_feedback_at_zero: false,
            trim_leading_zeros: false,
        }
    }
}

/// A saved runout result (JSON).
///
/// Field names follow the response shape downstream consumers already read
/// (`forecast`, `cumulative_sold_units`, `runout_day`, `current_stock`, `period`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunoutFile {
    pub tool: String,
    pub sku: String,
    pub runout_day: NaiveDate,
    pub days_until_runout: i64,
    pub current_stock: f64,
    pub period: usize,
    pub iterations: usize,
    pub last_observed_date: NaiveDate,
    pub model: TrendModel,
    pub fit_quality: FitQuality,
    pub forecast: Vec<ForecastPoint>,
    pub cumulative_sold_units: Vec<CumulativePoint>,
}
