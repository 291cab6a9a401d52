//! Forecast projection.
//!
//! Evaluates a fitted trend on the `period` days that follow the last observed
//! day and accumulates the running total of predicted consumption.

use chrono::{Days, NaiveDate};

use crate::domain::{CumulativePoint, ForecastPoint, TrendModel};
use crate::error::RunoutError;
use crate::models::predict;

/// Forecast and running total for one horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub forecast: Vec<ForecastPoint>,
    pub cumulative: Vec<CumulativePoint>,
}

impl Projection {
    /// Running total at the end of the horizon.
    pub fn closing_total(&self) -> Option<f64> {
        self.cumulative.last().map(|c| c.running_total)
    }
}

/// Project `period` days past `(last_day_index, last_date)`.
///
/// `opening_total` is the running total carried over from earlier horizons, so
/// consecutive projections concatenate into one continuous prefix sum.
/// Predictions are passed through unmodified, negative values included.
pub fn project(
    model: &TrendModel,
    last_day_index: u32,
    last_date: NaiveDate,
    period: usize,
    opening_total: f64,
) -> Result<Projection, RunoutError> {
    if period == 0 {
        return Err(RunoutError::InvalidPeriod(period));
    }

    let mut forecast = Vec::with_capacity(period);
    let mut cumulative = Vec::with_capacity(period);
    let mut running_total = opening_total;

    for step in 1..=period {
        let day_index = f64::from(last_day_index) + step as f64;
        let date = last_date
            .checked_add_days(Days::new(step as u64))
            .ok_or_else(|| RunoutError::InvalidIndex {
                position: step - 1,
                reason: format!("forecast date {step} day(s) after {last_date} is out of range"),
            })?;

        let quantity = predict(model, day_index);
        running_total += quantity;

        forecast.push(ForecastPoint { date, quantity });
        cumulative.push(CumulativePoint {
            date,
            running_total,
        });
    }

    Ok(Projection {
        forecast,
        cumulative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn flat_model_accumulates_linearly() {
        let model = TrendModel::Linear {
            intercept: 10.0,
            slope: 0.0,
        };
        let p = project(&model, 2, d(2024, 1, 3), 5, 0.0).unwrap();

        let dates: Vec<NaiveDate> = p.forecast.iter().map(|f| f.date).collect();
        assert_eq!(
            dates,
            vec![d(2024, 1, 4), d(2024, 1, 5), d(2024, 1, 6), d(2024, 1, 7), d(2024, 1, 8)]
        );
        let totals: Vec<f64> = p.cumulative.iter().map(|c| c.running_total).collect();
        assert_eq!(totals, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn evaluates_trend_from_next_day_index() {
        let model = TrendModel::Linear {
            intercept: 1.0,
            slope: 1.0,
        };
        // Last observed day index 9 -> forecasts at 10, 11, 12.
        let p = project(&model, 9, d(2024, 1, 10), 3, 0.0).unwrap();
        let q: Vec<f64> = p.forecast.iter().map(|f| f.quantity).collect();
        assert_eq!(q, vec![11.0, 12.0, 13.0]);
    }

    #[test]
    fn negative_predictions_pass_through() {
        let model = TrendModel::Linear {
            intercept: 2.0,
            slope: -1.0,
        };
        let p = project(&model, 1, d(2024, 1, 2), 3, 0.0).unwrap();
        let q: Vec<f64> = p.forecast.iter().map(|f| f.quantity).collect();
        assert_eq!(q, vec![0.0, -1.0, -2.0]);
        assert_eq!(p.closing_total(), Some(-3.0));
    }

    #[test]
    fn period_one_yields_single_point() {
        let model = TrendModel::Constant { level: 2.0 };
        let p = project(&model, 0, d(2024, 1, 1), 1, 0.0).unwrap();
        assert_eq!(p.forecast.len(), 1);
        assert_eq!(p.cumulative.len(), 1);
    }

    #[test]
    fn opening_total_carries_into_running_total() {
        let model = TrendModel::Constant { level: 2.0 };
        let p = project(&model, 0, d(2024, 1, 1), 2, 100.0).unwrap();
        let totals: Vec<f64> = p.cumulative.iter().map(|c| c.running_total).collect();
        assert_eq!(totals, vec![102.0, 104.0]);
    }

    #[test]
    fn zero_period_is_rejected() {
        let model = TrendModel::Constant { level: 2.0 };
        let err = project(&model, 0, d(2024, 1, 1), 0, 0.0).unwrap_err();
        assert_eq!(err, RunoutError::InvalidPeriod(0));
    }
}
