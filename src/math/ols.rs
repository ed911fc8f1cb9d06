//! Ordinary least squares for the per-regime lines.
//!
//! Every candidate breakpoint needs two small regressions of the form:
//!
//! ```text
//! minimize Σ (v_i - (a + b T_i))^2
//! ```
//!
//! over the samples of one regime, followed by a 2×2 solve for the point where
//! the two lines meet.
//!
//! Implementation choices:
//! - We solve the regression with SVD so tall design matrices are handled
//!   without forming normal equations.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The intersection solve is guarded by an explicit slope comparison; a
//!   singular system is reported, never turned into NaN/inf.

use nalgebra::{DMatrix, DVector, Matrix2, Vector2};

use crate::domain::LineFit;
use crate::error::FitError;

/// Two regime lines count as parallel when their slopes diverge by less than
/// this fraction of the volume scale across the whole temperature span.
pub const PARALLEL_SLOPE_TOL: f64 = 1e-9;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x`.
///
/// `r_squared` follows the usual `1 - SS_res / SS_tot`. When `y` is constant
/// (`SS_tot == 0`) it is 1.0 for a perfect fit (up to rounding) and 0.0 otherwise.
///
/// Returns `None` for fewer than two points or an unsolvable system.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    let intercept = beta[0];
    let slope = beta[1];

    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&x, &yi) in xs.iter().zip(ys) {
        let r = yi - (intercept + slope * x);
        ss_res += r * r;
        let d = yi - mean_y;
        ss_tot += d * d;
    }

    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res <= f64::EPSILON * ys.iter().map(|y| y * y).sum::<f64>() {
        1.0
    } else {
        0.0
    };

    Some(LineFit {
        slope,
        intercept,
        r_squared,
        n_points: n,
    })
}

/// Intersect two lines by solving
///
/// ```text
/// slope_lo·T - v = -intercept_lo
/// slope_hi·T - v = -intercept_hi
/// ```
///
/// for `(T, v)`.
///
/// The parallel check is made in data units: `t_span` is the temperature range
/// of the series and `v_scale` its largest absolute volume. Lines whose
/// separation changes by less than `PARALLEL_SLOPE_TOL * v_scale` over the span
/// are singular, which also catches flat data whose fitted slopes are pure
/// rounding noise.
pub fn intersect_lines(
    low: &LineFit,
    high: &LineFit,
    t_span: f64,
    v_scale: f64,
) -> Result<(f64, f64), FitError> {
    let singular = || FitError::SingularFit {
        slope_lo: low.slope,
        slope_hi: high.slope,
    };

    let drift = (low.slope - high.slope).abs() * t_span.abs();
    if !drift.is_finite() || drift <= PARALLEL_SLOPE_TOL * v_scale.abs() {
        return Err(singular());
    }

    let a = Matrix2::new(low.slope, -1.0, high.slope, -1.0);
    let b = Vector2::new(-low.intercept, -high.intercept);
    let solution = a.lu().solve(&b).ok_or_else(singular)?;

    let (tg, volume) = (solution[0], solution[1]);
    if !(tg.is_finite() && volume.is_finite()) {
        return Err(singular());
    }
    Ok((tg, volume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_exact_line() {
        let xs: Vec<f64> = (0..10).map(|i| 100.0 + 10.0 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 0.8 + 2e-4 * x).collect();

        let fit = fit_line(&xs, &ys).unwrap();
        assert!((fit.slope - 2e-4).abs() < 1e-12);
        assert!((fit.intercept - 0.8).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.n_points, 10);
    }

    #[test]
    fn fit_line_scores_noisy_data_below_one() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.5, 1.5, 3.0];
        let fit = fit_line(&xs, &ys).unwrap();
        // slope 0.9, intercept 0.15, SS_res 0.45, SS_tot 4.5
        assert!((fit.slope - 0.9).abs() < 1e-12);
        assert!((fit.r_squared - 0.9).abs() < 1e-12);
    }

    #[test]
    fn fit_line_constant_data_is_perfect() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn fit_line_needs_two_points() {
        assert!(fit_line(&[1.0], &[1.0]).is_none());
        assert!(fit_line(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn intersect_lines_finds_crossing() {
        let low = LineFit { slope: 1.0, intercept: 0.0, r_squared: 1.0, n_points: 2 };
        let high = LineFit { slope: 3.0, intercept: -4.0, r_squared: 1.0, n_points: 2 };
        let (t, v) = intersect_lines(&low, &high, 10.0, 10.0).unwrap();
        assert!((t - 2.0).abs() < 1e-12);
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn intersect_lines_rejects_parallel_lines() {
        let low = LineFit { slope: 2e-4, intercept: 0.9, r_squared: 1.0, n_points: 5 };
        let high = LineFit { slope: 2e-4 * (1.0 + 1e-13), intercept: 0.95, r_squared: 1.0, n_points: 5 };
        assert!(matches!(
            intersect_lines(&low, &high, 500.0, 1.1),
            Err(FitError::SingularFit { .. })
        ));

        let flat = LineFit { slope: 0.0, intercept: 1.0, r_squared: 1.0, n_points: 3 };
        assert!(intersect_lines(&flat, &flat, 500.0, 1.0).is_err());
    }

    #[test]
    fn rounding_noise_slopes_of_opposite_sign_are_parallel() {
        // Slopes a flat fit can come back with: relative difference is huge,
        // absolute drift over the span is nothing.
        let low = LineFit { slope: 1.73e-18, intercept: 0.95, r_squared: 1.0, n_points: 21 };
        let high = LineFit { slope: -1.08e-17, intercept: 0.95, r_squared: 1.0, n_points: 31 };
        assert!(matches!(
            intersect_lines(&low, &high, 500.0, 0.95),
            Err(FitError::SingularFit { .. })
        ));
    }

    #[test]
    fn small_but_real_kinks_still_intersect() {
        // 1e-6 volume units of drift over 500 K is far above the threshold.
        let low = LineFit { slope: 0.0, intercept: 1.0, r_squared: 1.0, n_points: 10 };
        let high = LineFit { slope: 2e-9, intercept: 1.0 - 2e-9 * 300.0, r_squared: 1.0, n_points: 10 };
        let (t, _) = intersect_lines(&low, &high, 500.0, 1.0).unwrap();
        assert!((t - 300.0).abs() < 1e-3, "t={t}");
    }
}
