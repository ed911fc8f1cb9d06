//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging and sizes the rayon pool
//! - runs a sweep (CSV replay or synthetic) through the fit pipeline
//! - prints summaries/plots and writes optional exports

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Command, FitArgs, OutputArgs, PlotArgs, SimulateArgs, SplitArgs};
use crate::domain::{Breakpoint, CandidateRange, OutputConfig, TgConfig};
use crate::error::AppError;
use crate::sweep::{CsvSweep, SyntheticSweep};

pub mod pipeline;

/// Entry point for the `tg` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; the TG_* variables are optional.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    crate::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| AppError::new(4, format!("Failed to size thread pool: {e}")))?;
        debug!(threads, "rayon pool configured");
    }

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = tg_config_from_args(&args.split)?;
    let output = output_config_from_args(&args.output);

    let sweep = CsvSweep::open(&args.input)?;
    let table = sweep.table();
    info!(
        rows = table.rows.len(),
        rejected = table.row_errors.len(),
        "sweep table loaded"
    );

    let temperatures = args.temperatures.unwrap_or_else(|| sweep.temperatures());
    let source = args.input.display().to_string();
    let report = pipeline::run_with_sweep(&sweep, &temperatures, &source, &config)?;

    println!("{}", pipeline::render_output(&report, &output));
    pipeline::write_exports(&report, &output)
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = tg_config_from_args(&args.split)?;
    let output = output_config_from_args(&args.output);

    let temperatures = cooling_schedule(args.t_max, args.t_min, args.t_step)?;
    let sweep = SyntheticSweep {
        tg: args.tg,
        volume_at_tg: args.volume_at_tg,
        glassy_slope: args.glassy_slope,
        rubbery_slope: args.rubbery_slope,
        density_noise: args.noise,
        samples_per_temperature: args.samples_per_temperature,
        replicates: args.replicates,
        seed: args.seed,
    };
    let source = format!(
        "synthetic (Tg={}, replicates={}, seed={})",
        args.tg, args.replicates, args.seed
    );
    let report = pipeline::run_with_sweep(&sweep, &temperatures, &source, &config)?;

    println!("{}", pipeline::render_output(&report, &output));
    pipeline::write_exports(&report, &output)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report::read_report_json(&args.report)?;
    let plot = crate::plot::render_report_plot(&report, args.width, args.height);

    println!("{plot}");
    Ok(())
}

pub fn tg_config_from_args(args: &SplitArgs) -> Result<TgConfig, AppError> {
    let fixed_breakpoint = match (args.breakpoint, args.breakpoint_lo, args.breakpoint_hi) {
        (Some(t), _, _) => Some(Breakpoint::Single(t)),
        (None, Some(lo), Some(hi)) => Some(Breakpoint::pair(lo, hi)?),
        _ => None,
    };
    let candidates = match &args.candidates {
        Some(values) => CandidateRange::Explicit(values.clone()),
        None => CandidateRange::Trim(args.trim),
    };

    Ok(TgConfig {
        strategy: args.split,
        fixed_breakpoint,
        tolerance: args.tol,
        max_attempts: args.max_attempts,
        candidates,
        on_non_convergence: args.fallback,
    })
}

pub fn output_config_from_args(args: &OutputArgs) -> OutputConfig {
    OutputConfig {
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        show_trace: args.show_trace,
        export_trace: args.export_trace.clone(),
        export_report: args.export_report.clone(),
    }
}

/// Upper bound on the number of synthetic set points.
const MAX_SCHEDULE_POINTS: usize = 100_000;

/// Set points visited from `t_max` down to `t_min` (inclusive) in `t_step` steps.
fn cooling_schedule(t_max: f64, t_min: f64, t_step: f64) -> Result<Vec<f64>, AppError> {
    if !(t_max.is_finite() && t_min.is_finite() && t_step.is_finite()) || t_step <= 0.0 {
        return Err(AppError::new(2, "Temperature range and step must be finite, step > 0."));
    }
    if t_min >= t_max {
        return Err(AppError::new(
            2,
            format!("--t-min ({t_min}) must be below --t-max ({t_max})."),
        ));
    }
    let steps = ((t_max - t_min) / t_step + 1e-9).floor();
    if !steps.is_finite() || steps >= MAX_SCHEDULE_POINTS as f64 {
        return Err(AppError::new(
            2,
            format!(
                "--t-step {t_step} over [{t_min}, {t_max}] gives more than {MAX_SCHEDULE_POINTS} set points."
            ),
        ));
    }
    let steps = steps as usize;
    Ok((0..=steps).map(|i| t_max - i as f64 * t_step).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{NonConvergencePolicy, SplitStrategy};

    fn split_args(argv: &[&str]) -> SplitArgs {
        let mut full = vec!["tg", "fit", "--input", "x.csv"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Fit(args) => args.split,
            _ => unreachable!(),
        }
    }

    #[test]
    fn config_defaults_match_library_defaults() {
        let config = tg_config_from_args(&split_args(&[])).unwrap();
        assert_eq!(config, TgConfig::default());
    }

    #[test]
    fn fixed_pair_and_candidates_are_mapped() {
        let config = tg_config_from_args(&split_args(&[
            "--split", "fixed", "--breakpoint-lo", "300", "--breakpoint-hi", "400",
            "--candidates", "310,320", "--fallback", "last-guess",
        ]))
        .unwrap();
        assert_eq!(config.strategy, SplitStrategy::Fixed);
        assert_eq!(config.fixed_breakpoint, Some(Breakpoint::Pair(300.0, 400.0)));
        assert_eq!(config.candidates, CandidateRange::Explicit(vec![310.0, 320.0]));
        assert_eq!(config.on_non_convergence, NonConvergencePolicy::LastGuess);
    }

    #[test]
    fn inverted_pair_is_a_usage_error() {
        let err = tg_config_from_args(&split_args(&[
            "--breakpoint-lo", "400", "--breakpoint-hi", "300",
        ]))
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_plot_overrides_plot() {
        let cli = Cli::try_parse_from(["tg", "simulate", "--plot", "--no-plot"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert!(!output_config_from_args(&args.output).plot);
    }

    #[test]
    fn cooling_schedule_is_inclusive_and_descending() {
        let temps = cooling_schedule(600.0, 100.0, 10.0).unwrap();
        assert_eq!(temps.len(), 51);
        assert_eq!(temps[0], 600.0);
        assert_eq!(temps[50], 100.0);
        assert!(cooling_schedule(100.0, 600.0, 10.0).is_err());
        assert!(cooling_schedule(600.0, 100.0, 0.0).is_err());
    }

    #[test]
    fn tiny_step_is_rejected_before_allocating() {
        let err = cooling_schedule(600.0, 100.0, 1e-300).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(cooling_schedule(600.0, 100.0, 1e-3).is_err());
        assert_eq!(cooling_schedule(600.0, 100.0, 0.5).unwrap().len(), 1001);
    }
}
