//! Error types.
//!
//! - `RunoutError` is what the engine and its collaborators return. Every kind
//!   is terminal for the current request.
//! - `AppError` is the CLI-facing error: a message plus a process exit code, so
//!   scripts can tell "no data" apart from "no runout found" or "bad input".

use std::time::Duration;

use thiserror::Error;

/// Which limit stopped the extension loop before stock ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndeterminedBound {
    MaxIterations,
    MaxHorizonDays,
    TimeBudget,
    /// The fitted demand is non-increasing and already at or below zero, so the
    /// running total can never climb past the stock level.
    DemandExhausted,
}

impl UndeterminedBound {
    pub fn label(self) -> &'static str {
        match self {
            UndeterminedBound::MaxIterations => "max iterations",
            UndeterminedBound::MaxHorizonDays => "max horizon days",
            UndeterminedBound::TimeBudget => "time budget",
            UndeterminedBound::DemandExhausted => "demand exhausted",
        }
    }
}

impl std::fmt::Display for UndeterminedBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunoutError {
    #[error("The order history is empty.")]
    EmptySeries,

    #[error("Invalid date at observation {position}: {reason}")]
    InvalidIndex { position: usize, reason: String },

    #[error("Invalid quantity {value} at observation {position}.")]
    InvalidQuantity { position: usize, value: f64 },

    #[error("Forecast period must be between 1 and the max horizon in days (got {0}).")]
    InvalidPeriod(usize),

    #[error("Current stock must be a finite, non-negative number (got {0}).")]
    InvalidStock(f64),

    #[error("Trend fit failed: {0}")]
    Fit(String),

    #[error(
        "Runout not determined within bounds: stopped by {bound} after {iterations} iteration(s) / {horizon_days} day(s)."
    )]
    RunoutUndetermined {
        iterations: usize,
        horizon_days: usize,
        bound: UndeterminedBound,
    },

    #[error("Runout computation cancelled after {iterations} iteration(s).")]
    Cancelled { iterations: usize },

    #[error("No {what} found for SKU '{sku}'.")]
    UpstreamNotFound { sku: String, what: &'static str },

    #[error("Worker pool error: {0}")]
    Pool(String),
}

impl RunoutError {
    pub fn not_found(sku: impl Into<String>, what: &'static str) -> Self {
        RunoutError::UpstreamNotFound {
            sku: sku.into(),
            what,
        }
    }

    /// Short machine-readable kind, used in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RunoutError::EmptySeries => "empty_series",
            RunoutError::InvalidIndex { .. } => "invalid_index",
            RunoutError::InvalidQuantity { .. } => "invalid_quantity",
            RunoutError::InvalidPeriod(_) => "invalid_period",
            RunoutError::InvalidStock(_) => "invalid_stock",
            RunoutError::Fit(_) => "fit_error",
            RunoutError::RunoutUndetermined { .. } => "runout_undetermined",
            RunoutError::Cancelled { .. } => "cancelled",
            RunoutError::UpstreamNotFound { .. } => "upstream_not_found",
            RunoutError::Pool(_) => "pool_error",
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunoutError::InvalidIndex { .. }
            | RunoutError::InvalidQuantity { .. }
            | RunoutError::InvalidPeriod(_)
            | RunoutError::InvalidStock(_) => 2,
            RunoutError::EmptySeries => 3,
            RunoutError::Fit(_) | RunoutError::Pool(_) => 4,
            RunoutError::RunoutUndetermined { .. } => 5,
            RunoutError::UpstreamNotFound { .. } => 6,
            RunoutError::Cancelled { .. } => 7,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<RunoutError> for AppError {
    fn from(err: RunoutError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Format a duration the way log lines and reports show it (`12.3ms`).
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}ms", elapsed.as_secs_f64() * 1000.0)
}
