//! Ordinary least squares trend fit.
//!
//! Given a normalized series `(day_index_i, value_i)` we solve
//!
//! ```text
//! value_i ≈ β0 + β1 * day_index_i
//! ```
//!
//! and report the fitted line with its SSE/RMSE.
//!
//! A series whose points all share one day index (in practice: a single
//! observed day) has a singular design matrix. Instead of failing, we fall back
//! to a constant model that predicts the mean.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use crate::domain::{FitQuality, NormalizedSeries, TrendFit, TrendModel};
use crate::error::RunoutError;
use crate::math::{mean, solve_least_squares};
use crate::models::{LINEAR_BETA_LEN, fill_design_row, predict};

/// Fit a linear trend to the series.
pub fn fit_trend(series: &NormalizedSeries) -> Result<TrendFit, RunoutError> {
    let points = series.points();
    if points.is_empty() {
        return Err(RunoutError::EmptySeries);
    }

    let x: Vec<f64> = points.iter().map(|p| f64::from(p.day_index)).collect();
    let y: Vec<f64> = points.iter().map(|p| p.value).collect();

    if let Some(pos) = y.iter().position(|v| !v.is_finite()) {
        return Err(RunoutError::Fit(format!(
            "non-finite value {} at day {}",
            y[pos], points[pos].day_index
        )));
    }

    let model = if series.first().day_index == series.last().day_index {
        let level = mean(&y).ok_or(RunoutError::EmptySeries)?;
        warn!(
            n = points.len(),
            level,
            "single distinct day in history; using constant mean model"
        );
        TrendModel::Constant { level }
    } else {
        solve_linear(&x, &y)?
    };

    let quality = fit_quality(&model, &x, &y);
    if !(quality.sse.is_finite() && quality.rmse.is_finite()) {
        return Err(RunoutError::Fit("non-finite residuals".to_string()));
    }

    Ok(TrendFit { model, quality })
}

fn solve_linear(x: &[f64], y: &[f64]) -> Result<TrendModel, RunoutError> {
    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, LINEAR_BETA_LEN);
    let mut row = [0.0; LINEAR_BETA_LEN];
    for (i, &day) in x.iter().enumerate() {
        fill_design_row(day, &mut row);
        for (j, v) in row.iter().enumerate() {
            design[(i, j)] = *v;
        }
    }
    let target = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &target).ok_or_else(|| {
        RunoutError::Fit(format!("least squares did not converge on {n} points"))
    })?;

    Ok(TrendModel::Linear {
        intercept: beta[0],
        slope: beta[1],
    })
}

fn fit_quality(model: &TrendModel, x: &[f64], y: &[f64]) -> FitQuality {
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&day, &obs)| {
            let r = obs - predict(model, day);
            r * r
        })
        .sum();
    let n = x.len();
    FitQuality {
        n,
        sse,
        rmse: (sse / n as f64).sqrt(),
    }
}
