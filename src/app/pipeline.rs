//! Shared fit pipeline used by the `fit` and `simulate` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sweep -> replicate aggregation -> split selection -> final fit -> report
//!
//! The commands then only differ in which [`TemperatureSweep`] they hand in.

use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::{OutputConfig, TgConfig, TgReport};
use crate::error::AppError;
use crate::fit::estimate_tg;
use crate::sweep::TemperatureSweep;

/// Name stamped into every saved report.
pub const TOOL_NAME: &str = "tg";

/// Execute the full pipeline and return the run report.
#[instrument(skip_all, fields(source = source, temperatures = temperatures.len()))]
pub fn run_with_sweep(
    sweep: &dyn TemperatureSweep,
    temperatures: &[f64],
    source: &str,
    config: &TgConfig,
) -> Result<TgReport, AppError> {
    // 1) Run the sweep.
    let replicates = sweep.run_sweep(temperatures)?;

    // 2) Average replicates into one (T, v) series.
    let series = replicates.aggregate()?;
    info!(
        samples = series.len(),
        replicates = replicates.replicate_count(),
        "replicates aggregated"
    );

    // 3) Select the split and fit both regimes.
    let estimate = estimate_tg(&series, config)?;
    info!(tg = estimate.result.tg, breakpoint = %estimate.result.breakpoint, "tg estimated");

    Ok(TgReport {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        source: source.to_string(),
        series,
        estimate,
    })
}

/// Render the terminal output for a finished run.
pub fn render_output(report: &TgReport, output: &OutputConfig) -> String {
    let mut out = crate::report::format_run_summary(report);

    if output.show_trace {
        if let Some(trace) = &report.estimate.trace {
            out.push_str(&crate::report::format_trace(trace));
            out.push('\n');
        }
    }
    if output.plot {
        out.push_str(&crate::plot::render_report_plot(
            report,
            output.plot_width,
            output.plot_height,
        ));
    }
    out
}

/// Write the optional trace/report exports.
pub fn write_exports(report: &TgReport, output: &OutputConfig) -> Result<(), AppError> {
    if let Some(path) = &output.export_trace {
        match &report.estimate.trace {
            Some(trace) => crate::io::export::write_trace_csv(path, trace)?,
            None => {
                return Err(AppError::new(
                    2,
                    "--export-trace needs a search trace; use --split auto2d.",
                ));
            }
        }
        info!(path = %path.display(), "search trace exported");
    }
    if let Some(path) = &output.export_report {
        crate::io::report::write_report_json(path, report)?;
        info!(path = %path.display(), "report exported");
    }
    Ok(())
}
