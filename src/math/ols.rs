//! Least squares solver.
//!
//! The trend fit is an ordinary least squares problem with a tall design
//! matrix (one row per observed day, one column per coefficient):
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! We solve it through SVD rather than QR. Nalgebra's `QR::solve` is meant for
//! square systems and panics on tall ones, and SVD also copes with the nearly
//! collinear columns a long, far-from-zero day index produces.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Retry with looser singular-value cutoffs before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_recovers_exact_line() {
        // y = 4 + 0.5x on x = [0, 1, 2, 3]
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[4.0, 4.5, 5.0, 5.5]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 4.0).abs() < 1e-10);
        assert!((beta[1] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn least_squares_minimizes_residuals_on_noisy_points() {
        // Step-shaped demand: no line passes through every point.
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 1.0, 5.0, 5.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        // OLS on this data: slope 1.6, intercept 0.6
        assert!((beta[1] - 1.6).abs() < 1e-9, "slope={}", beta[1]);
        assert!((beta[0] - 0.6).abs() < 1e-9, "intercept={}", beta[0]);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
