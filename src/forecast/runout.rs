//! Runout detection on a cumulative forecast.

use chrono::NaiveDate;

use crate::domain::CumulativePoint;

/// Index of the first point whose running total strictly exceeds `current_stock`.
///
/// A running total exactly equal to the stock level is not a runout: the last
/// unit is still on the shelf.
pub fn first_crossing(cumulative: &[CumulativePoint], current_stock: f64) -> Option<usize> {
    cumulative
        .iter()
        .position(|c| c.running_total > current_stock)
}

/// Date on which cumulative consumption first exceeds `current_stock`.
pub fn estimate_runout(cumulative: &[CumulativePoint], current_stock: f64) -> Option<NaiveDate> {
    first_crossing(cumulative, current_stock).map(|i| cumulative[i].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cumulative(totals: &[f64]) -> Vec<CumulativePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(i, &t)| CumulativePoint {
                date: start + chrono::Duration::days(i as i64),
                running_total: t,
            })
            .collect()
    }

    #[test]
    fn returns_first_strict_crossing() {
        let c = cumulative(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(first_crossing(&c, 25.0), Some(2));
        assert_eq!(estimate_runout(&c, 25.0), Some(c[2].date));
    }

    #[test]
    fn equality_is_not_a_runout() {
        let c = cumulative(&[10.0, 20.0, 30.0]);
        assert_eq!(first_crossing(&c, 20.0), Some(2));
        assert_eq!(first_crossing(&c, 30.0), None);
    }

    #[test]
    fn zero_stock_runs_out_on_first_positive_total() {
        let c = cumulative(&[0.0, -1.0, 0.5, 2.0]);
        assert_eq!(first_crossing(&c, 0.0), Some(2));
    }

    #[test]
    fn no_crossing_and_empty_input_are_absent() {
        assert_eq!(estimate_runout(&cumulative(&[1.0, 2.0]), 100.0), None);
        assert_eq!(estimate_runout(&[], 0.0), None);
    }
}
