//! Two-regime line fit at a fixed breakpoint.
//!
//! Given a breakpoint we:
//! - split the series into the low-temperature and high-temperature fit sets
//! - fit each set with ordinary least squares
//! - intersect the two lines to obtain `(Tg, v(Tg))`
//!
//! The function is pure: identical inputs give bit-identical results.

use crate::domain::{BilinearResult, Breakpoint, MIN_POINTS_PER_SIDE, Regime, SampleSeries};
use crate::error::FitError;
use crate::math::{fit_line, intersect_lines};

/// Fit both regimes at `breakpoint` and intersect them.
///
/// Low set: `T <= breakpoint.low()`. High set: `T >= breakpoint.high()`.
/// A symmetric breakpoint that lands on a sample puts that sample in both sets.
pub fn fit_bilinear(series: &SampleSeries, breakpoint: Breakpoint) -> Result<BilinearResult, FitError> {
    if !breakpoint.is_finite() {
        return Err(FitError::InvalidParameter(format!(
            "breakpoint must be finite, got {breakpoint:?}"
        )));
    }

    let (lo_t, lo_v) = regime_columns(series, |t| t <= breakpoint.low());
    if lo_t.len() < MIN_POINTS_PER_SIDE {
        return Err(FitError::InsufficientData {
            side: Regime::Low,
            found: lo_t.len(),
        });
    }
    let (hi_t, hi_v) = regime_columns(series, |t| t >= breakpoint.high());
    if hi_t.len() < MIN_POINTS_PER_SIDE {
        return Err(FitError::InsufficientData {
            side: Regime::High,
            found: hi_t.len(),
        });
    }

    let low = fit_line(&lo_t, &lo_v).ok_or_else(|| {
        FitError::InvalidSeries("least-squares solve failed for the low regime".to_string())
    })?;
    let high = fit_line(&hi_t, &hi_v).ok_or_else(|| {
        FitError::InvalidSeries("least-squares solve failed for the high regime".to_string())
    })?;

    let (t_min, t_max) = series.temperature_range();
    let v_scale = series
        .samples()
        .iter()
        .fold(0.0_f64, |acc, s| acc.max(s.specific_volume.abs()));
    let (tg, tg_specific_volume) = intersect_lines(&low, &high, t_max - t_min, v_scale)?;

    Ok(BilinearResult {
        breakpoint,
        low,
        high,
        tg,
        tg_specific_volume,
    })
}

fn regime_columns(series: &SampleSeries, keep: impl Fn(f64) -> bool) -> (Vec<f64>, Vec<f64>) {
    series
        .samples()
        .iter()
        .filter(|s| keep(s.temperature))
        .map(|s| (s.temperature, s.specific_volume))
        .unzip()
}
