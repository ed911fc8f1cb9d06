//! Strategy dispatch: choose the breakpoint(s), then run the final fit.

use tracing::{info, warn};

use crate::domain::{
    Breakpoint, IterativeSummary, NonConvergencePolicy, SampleSeries, SplitStrategy, TgConfig,
    TgEstimate,
};
use crate::error::FitError;
use crate::fit::bilinear::fit_bilinear;
use crate::fit::grid::select_split_2d;
use crate::fit::iterative::select_split_1d;

/// Estimate Tg from a sample series according to `config.strategy`.
pub fn estimate_tg(series: &SampleSeries, config: &TgConfig) -> Result<TgEstimate, FitError> {
    let estimate = match config.strategy {
        SplitStrategy::Auto2d => {
            let candidates = config.candidates.resolve(series);
            let selection = select_split_2d(series, &candidates)?;
            let result = fit_bilinear(series, selection.breakpoint())?;
            TgEstimate {
                strategy: config.strategy,
                result,
                trace: Some(selection.trace),
                iterative: None,
            }
        }
        SplitStrategy::Auto1d => {
            let summary = match select_split_1d(series, config.tolerance, config.max_attempts) {
                Ok(summary) => summary,
                Err(FitError::NonConvergence {
                    attempts,
                    last_guess,
                    last_tg,
                    ..
                }) if config.on_non_convergence == NonConvergencePolicy::LastGuess => {
                    warn!(last_guess, last_tg, "falling back to the latest 1-D estimate");
                    IterativeSummary {
                        breakpoint: last_tg,
                        attempts,
                        last_step: (last_tg - last_guess).abs(),
                        converged: false,
                    }
                }
                Err(err) => return Err(err),
            };
            let result = fit_bilinear(series, Breakpoint::Single(summary.breakpoint))?;
            TgEstimate {
                strategy: config.strategy,
                result,
                trace: None,
                iterative: Some(summary),
            }
        }
        SplitStrategy::Fixed => {
            let breakpoint = config.fixed_breakpoint.ok_or_else(|| {
                FitError::InvalidParameter(
                    "fixed split strategy requires a breakpoint".to_string(),
                )
            })?;
            TgEstimate {
                strategy: config.strategy,
                result: fit_bilinear(series, breakpoint)?,
                trace: None,
                iterative: None,
            }
        }
    };

    info!(
        strategy = ?estimate.strategy,
        breakpoint = %estimate.result.breakpoint,
        tg = estimate.result.tg,
        "Tg estimated"
    );
    Ok(estimate)
}
