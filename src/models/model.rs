//! Trend model evaluation.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given day index (for OLS)
//! - predict the quantity at a day index (for forecasts and residuals)

use crate::domain::TrendModel;

/// Number of coefficients in the linear trend (intercept + slope).
pub const LINEAR_BETA_LEN: usize = 2;

/// Fill a design row for the linear trend.
///
/// The row includes the constant term first (intercept).
///
/// # Panics
/// Panics if `out` is shorter than `LINEAR_BETA_LEN`.
pub fn fill_design_row(day_index: f64, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = day_index;
}

/// Predict the quantity at `day_index`.
///
/// Output is not floored: a declining trend yields negative quantities.
pub fn predict(model: &TrendModel, day_index: f64) -> f64 {
    match *model {
        TrendModel::Linear { intercept, slope } => intercept + slope * day_index,
        TrendModel::Constant { level } => level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_prediction_is_unclamped() {
        let model = TrendModel::Linear {
            intercept: 10.0,
            slope: -2.0,
        };
        assert_eq!(predict(&model, 0.0), 10.0);
        assert_eq!(predict(&model, 7.0), -4.0);
    }

    #[test]
    fn constant_model_ignores_day_index() {
        let model = TrendModel::Constant { level: 3.5 };
        assert_eq!(predict(&model, 0.0), 3.5);
        assert_eq!(predict(&model, 1_000.0), 3.5);
    }

    #[test]
    fn design_row_has_intercept_first() {
        let mut row = [0.0; LINEAR_BETA_LEN];
        fill_design_row(12.0, &mut row);
        assert_eq!(row, [1.0, 12.0]);
    }
}
