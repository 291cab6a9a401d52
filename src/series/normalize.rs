//! Order history normalization.
//!
//! Turns a bag of `(date, quantity)` observations into the series the fitter
//! consumes:
//! - same-day quantities summed into one point
//! - sorted ascending by date
//! - `day_index = date - earliest date`, in whole days
//!
//! Every check that could otherwise surface as a NaN inside the regression
//! happens here, before any fit is attempted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::{NormalizedSeries, Observation, RawObservation, SeriesPoint};
use crate::error::RunoutError;

/// Preprocessing switches applied before day indices are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Drop zero-quantity days preceding the first positive day.
    ///
    /// Listings often exist for weeks before the first sale; those zeros drag
    /// the trend intercept down. A history with no positive day is kept as-is.
    pub trim_leading_zeros: bool,
}

/// Normalize typed observations.
pub fn normalize(
    observations: &[Observation],
    opts: &NormalizeOptions,
) -> Result<NormalizedSeries, RunoutError> {
    if observations.is_empty() {
        return Err(RunoutError::EmptySeries);
    }

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (position, obs) in observations.iter().enumerate() {
        if !obs.quantity.is_finite() {
            return Err(RunoutError::InvalidQuantity {
                position,
                value: obs.quantity,
            });
        }
        *by_date.entry(obs.date).or_insert(0.0) += obs.quantity;
    }

    let mut days: Vec<(NaiveDate, f64)> = by_date.into_iter().collect();
    if opts.trim_leading_zeros {
        if let Some(first_positive) = days.iter().position(|(_, q)| *q > 0.0) {
            days.drain(..first_positive);
        }
    }

    let origin = days[0].0;
    let mut points = Vec::with_capacity(days.len());
    for (position, (date, value)) in days.into_iter().enumerate() {
        let offset = (date - origin).num_days();
        let day_index = u32::try_from(offset).map_err(|_| RunoutError::InvalidIndex {
            position,
            reason: format!("day offset {offset} from {origin} is out of range"),
        })?;
        points.push(SeriesPoint {
            day_index,
            date,
            value,
        });
    }

    Ok(NormalizedSeries::from_sorted(points))
}

/// Convert untyped records and normalize them.
///
/// A record with a missing or unparseable date fails the whole series with
/// `InvalidIndex`; it is never skipped.
pub fn normalize_raw(
    raw: &[RawObservation],
    opts: &NormalizeOptions,
) -> Result<NormalizedSeries, RunoutError> {
    let observations = parse_observations(raw)?;
    normalize(&observations, opts)
}

/// Parse untyped records into observations.
pub fn parse_observations(raw: &[RawObservation]) -> Result<Vec<Observation>, RunoutError> {
    if raw.is_empty() {
        return Err(RunoutError::EmptySeries);
    }

    raw.iter()
        .enumerate()
        .map(|(position, r)| {
            let text = r.date.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let Some(text) = text else {
                return Err(RunoutError::InvalidIndex {
                    position,
                    reason: "missing date".to_string(),
                });
            };
            let date = parse_date(text).ok_or_else(|| RunoutError::InvalidIndex {
                position,
                reason: format!(
                    "unparseable date '{text}' (expected YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD or a timestamp)"
                ),
            })?;
            Ok(Observation::new(date, r.quantity))
        })
        .collect()
}

/// Parse a calendar date, accepting a few common export formats.
///
/// Timestamps (order `created_at` values) are truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

    let s = s.trim();
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
