//! Reporting utilities: residuals against the bilinear model and formatted
//! terminal output.

pub mod format;

pub use format::*;

use crate::domain::{BilinearResult, Regime, SampleSeries};

/// Observed vs. modelled specific volume for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResidual {
    pub temperature: f64,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
    /// Which line models this temperature (split at Tg).
    pub regime: Regime,
}

/// Residuals of every sample against the line governing its side of Tg.
pub fn compute_residuals(series: &SampleSeries, fit: &BilinearResult) -> Vec<SampleResidual> {
    series
        .samples()
        .iter()
        .map(|s| {
            let (regime, line) = if s.temperature <= fit.tg {
                (Regime::Low, &fit.low)
            } else {
                (Regime::High, &fit.high)
            };
            let fitted = line.predict(s.temperature);
            SampleResidual {
                temperature: s.temperature,
                observed: s.specific_volume,
                fitted,
                residual: s.specific_volume - fitted,
                regime,
            }
        })
        .collect()
}

/// Root-mean-square residual per regime (`None` when a regime has no samples).
pub fn regime_rmse(residuals: &[SampleResidual], regime: Regime) -> Option<f64> {
    let (sum, n) = residuals
        .iter()
        .filter(|r| r.regime == regime)
        .fold((0.0, 0usize), |(sum, n), r| (sum + r.residual * r.residual, n + 1));
    (n > 0).then(|| (sum / n as f64).sqrt())
}
