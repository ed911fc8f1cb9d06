//! 1-D fixed-point split selection.
//!
//! Starting from a guess (the median temperature by default), fit at the
//! guess, move the guess to the resulting Tg, and repeat until the two agree
//! within `tolerance`. Convergence is not guaranteed: a noisy series can make
//! the estimate bounce between two partitions forever, so the loop is capped at
//! `max_attempts` and reports [`FitError::NonConvergence`] when the cap is hit.

use tracing::{debug, info, instrument, warn};

use crate::domain::{Breakpoint, IterativeSummary, SampleSeries};
use crate::error::FitError;
use crate::fit::bilinear::fit_bilinear;

/// Run the fixed-point search from the series' median temperature.
pub fn select_split_1d(
    series: &SampleSeries,
    tolerance: f64,
    max_attempts: usize,
) -> Result<IterativeSummary, FitError> {
    select_split_1d_from(series, series.median_temperature(), tolerance, max_attempts)
}

/// Run the fixed-point search from an explicit initial guess.
///
/// Fit errors at any iterate (e.g. the estimate drifting off the end of the
/// series) propagate immediately.
#[instrument(level = "debug", skip(series))]
pub fn select_split_1d_from(
    series: &SampleSeries,
    initial_guess: f64,
    tolerance: f64,
    max_attempts: usize,
) -> Result<IterativeSummary, FitError> {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        return Err(FitError::InvalidParameter(format!(
            "tolerance must be finite and >= 0, got {tolerance}"
        )));
    }
    if max_attempts == 0 {
        return Err(FitError::InvalidParameter(
            "max_attempts must be >= 1".to_string(),
        ));
    }

    let mut guess = initial_guess;
    let mut last_guess = initial_guess;

    for attempt in 1..=max_attempts {
        let fit = fit_bilinear(series, Breakpoint::Single(guess))?;
        let step = (fit.tg - guess).abs();
        debug!(attempt, guess, tg = fit.tg, step, "fixed-point iterate");

        if step <= tolerance {
            info!(breakpoint = guess, attempts = attempt, "1-D split converged");
            return Ok(IterativeSummary {
                breakpoint: guess,
                attempts: attempt,
                last_step: step,
                converged: true,
            });
        }
        last_guess = guess;
        guess = fit.tg;
    }

    // `guess` now holds the Tg of the final attempt.
    warn!(
        tolerance,
        max_attempts,
        last_guess,
        last_tg = guess,
        "1-D split did not converge"
    );
    Err(FitError::NonConvergence {
        attempts: max_attempts,
        tolerance,
        last_guess,
        last_tg: guess,
    })
}
