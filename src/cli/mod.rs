//! Command-line parsing for the bilinear Tg fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{NonConvergencePolicy, SplitStrategy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tg", version, about = "Glass-transition temperature from bilinear volume-temperature fits")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Worker threads for the grid search (defaults to all cores).
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit Tg from a sweep CSV (`temperature,density[,replicate]`).
    Fit(FitArgs),
    /// Generate a seeded synthetic sweep with a known Tg and fit it.
    Simulate(SimulateArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
}

/// Split-selection options shared by `fit` and `simulate`.
#[derive(Debug, Args, Clone)]
pub struct SplitArgs {
    /// Breakpoint selection strategy.
    #[arg(long, value_enum, env = "TG_SPLIT", default_value_t = SplitStrategy::Auto2d)]
    pub split: SplitStrategy,

    /// Symmetric breakpoint for `--split fixed`.
    #[arg(long, conflicts_with_all = ["breakpoint_lo", "breakpoint_hi"])]
    pub breakpoint: Option<f64>,

    /// Low-regime upper bound for `--split fixed`.
    #[arg(long, requires = "breakpoint_hi")]
    pub breakpoint_lo: Option<f64>,

    /// High-regime lower bound for `--split fixed`.
    #[arg(long, requires = "breakpoint_lo")]
    pub breakpoint_hi: Option<f64>,

    /// Convergence tolerance for `--split auto1d` (temperature units).
    #[arg(long, env = "TG_SPLIT_1D_TOL", default_value_t = 1.0)]
    pub tol: f64,

    /// Iteration cap for `--split auto1d`.
    #[arg(long, env = "TG_SPLIT_1D_MAX_ATTEMPTS", default_value_t = 50)]
    pub max_attempts: usize,

    /// What to do when `auto1d` hits the iteration cap.
    #[arg(long, value_enum, default_value_t = NonConvergencePolicy::Abort)]
    pub fallback: NonConvergencePolicy,

    /// Samples dropped from each end of the series to form the `auto2d` candidates.
    #[arg(long, env = "TG_TRIM", default_value_t = 10)]
    pub trim: usize,

    /// Explicit `auto2d` candidate temperatures (overrides --trim).
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub candidates: Option<Vec<f64>>,
}

/// Presentation and export options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Disable plotting (overrides --plot).
    #[arg(long)]
    pub no_plot: bool,

    /// Print the full 2-D search trace.
    #[arg(long)]
    pub show_trace: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Export the 2-D search trace to CSV.
    #[arg(long = "export-trace", value_name = "CSV")]
    pub export_trace: Option<PathBuf>,

    /// Export the run report to JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Sweep CSV file.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Temperature visiting order (defaults to first-seen order in the file).
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub temperatures: Option<Vec<f64>>,

    #[command(flatten)]
    pub split: SplitArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// True Tg of the synthetic material.
    #[arg(long, default_value_t = 380.0)]
    pub tg: f64,

    /// Specific volume at Tg.
    #[arg(long, default_value_t = 1.0)]
    pub volume_at_tg: f64,

    /// Glassy expansion dv/dT.
    #[arg(long, default_value_t = 2.0e-4)]
    pub glassy_slope: f64,

    /// Rubbery expansion dv/dT.
    #[arg(long, default_value_t = 6.0e-4)]
    pub rubbery_slope: f64,

    /// Cooling starts here.
    #[arg(long, default_value_t = 600.0)]
    pub t_max: f64,

    /// Cooling ends here.
    #[arg(long, default_value_t = 100.0)]
    pub t_min: f64,

    /// Temperature step.
    #[arg(long, default_value_t = 10.0)]
    pub t_step: f64,

    /// Standard deviation of each density sample.
    #[arg(long, default_value_t = 2.0e-3)]
    pub noise: f64,

    /// Thermo samples per temperature.
    #[arg(long, default_value_t = 10)]
    pub samples_per_temperature: usize,

    /// Independent replicate runs.
    #[arg(long, default_value_t = 3)]
    pub replicates: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub split: SplitArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for plotting a saved report.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Report JSON produced by `--export-report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}
