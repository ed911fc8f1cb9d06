//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Minimum number of samples a regime needs for a line fit.
pub const MIN_POINTS_PER_SIDE: usize = 2;

/// Minimum series length: two points on each side of any split.
pub const MIN_SERIES_LEN: usize = 2 * MIN_POINTS_PER_SIDE;

/// One averaged observation from a temperature sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Temperature (K).
    pub temperature: f64,
    /// Specific volume (reciprocal density, e.g. cm³/g).
    pub specific_volume: f64,
    /// Spread across replicate runs. Reported only, never used in fitting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

impl Sample {
    pub fn new(temperature: f64, specific_volume: f64) -> Self {
        Self {
            temperature,
            specific_volume,
            std_dev: None,
        }
    }
}

/// Ordered series of samples with strictly increasing temperatures.
///
/// Construction validates the invariants the fitter relies on, so every
/// `SampleSeries` in the program has at least [`MIN_SERIES_LEN`] finite points
/// and no duplicate temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct SampleSeries {
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new(samples: Vec<Sample>) -> Result<Self, FitError> {
        if samples.len() < MIN_SERIES_LEN {
            return Err(FitError::InvalidSeries(format!(
                "need at least {MIN_SERIES_LEN} samples, got {}",
                samples.len()
            )));
        }
        for (i, s) in samples.iter().enumerate() {
            if !(s.temperature.is_finite() && s.specific_volume.is_finite()) {
                return Err(FitError::InvalidSeries(format!(
                    "non-finite sample at index {i}: T={}, v={}",
                    s.temperature, s.specific_volume
                )));
            }
        }
        for pair in samples.windows(2) {
            if pair[1].temperature <= pair[0].temperature {
                return Err(FitError::InvalidSeries(format!(
                    "temperatures must be strictly increasing ({} followed by {})",
                    pair[0].temperature, pair[1].temperature
                )));
            }
        }
        Ok(Self { samples })
    }

    /// Build a series from parallel temperature / specific-volume columns.
    pub fn from_columns(temperatures: &[f64], specific_volumes: &[f64]) -> Result<Self, FitError> {
        if temperatures.len() != specific_volumes.len() {
            return Err(FitError::InvalidSeries(format!(
                "column length mismatch: {} temperatures vs {} volumes",
                temperatures.len(),
                specific_volumes.len()
            )));
        }
        let samples = temperatures
            .iter()
            .zip(specific_volumes)
            .map(|(&t, &v)| Sample::new(t, v))
            .collect();
        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.temperature).collect()
    }

    pub fn temperature_range(&self) -> (f64, f64) {
        // Non-empty and sorted by construction.
        let first = self.samples[0].temperature;
        let last = self.samples[self.samples.len() - 1].temperature;
        (first, last)
    }

    /// Median temperature (mean of the two middle values for even lengths).
    pub fn median_temperature(&self) -> f64 {
        let n = self.samples.len();
        let mid = n / 2;
        if n % 2 == 1 {
            self.samples[mid].temperature
        } else {
            (self.samples[mid - 1].temperature + self.samples[mid].temperature) / 2.0
        }
    }

    /// Candidate breakpoints for the 2-D search: every temperature except the
    /// `trim` lowest and `trim` highest. Empty when trimming consumes the series.
    pub fn trimmed_temperatures(&self, trim: usize) -> Vec<f64> {
        let n = self.samples.len();
        if 2 * trim >= n {
            return Vec::new();
        }
        self.samples[trim..n - trim]
            .iter()
            .map(|s| s.temperature)
            .collect()
    }
}

impl TryFrom<Vec<Sample>> for SampleSeries {
    type Error = FitError;

    fn try_from(samples: Vec<Sample>) -> Result<Self, Self::Error> {
        SampleSeries::new(samples)
    }
}

impl From<SampleSeries> for Vec<Sample> {
    fn from(series: SampleSeries) -> Self {
        series.samples
    }
}

/// Which side of the transition a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Glassy (low-temperature) regime.
    Low,
    /// Rubbery/melt (high-temperature) regime.
    High,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Low => f.write_str("low"),
            Regime::High => f.write_str("high"),
        }
    }
}

/// Temperature(s) separating the low and high regimes.
///
/// - `Single(s)`: points `<= s` fit the low line, points `>= s` the high line.
/// - `Pair(lo, hi)`: points `<= lo` fit the low line, points `>= hi` the high
///   line; anything strictly between is excluded from both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Single(f64),
    Pair(f64, f64),
}

impl Breakpoint {
    /// Validated pair constructor for caller-supplied splits (`low <= high`).
    pub fn pair(low: f64, high: f64) -> Result<Self, FitError> {
        if !(low.is_finite() && high.is_finite()) {
            return Err(FitError::InvalidParameter(format!(
                "breakpoint pair must be finite, got ({low}, {high})"
            )));
        }
        if low > high {
            return Err(FitError::InvalidParameter(format!(
                "low breakpoint {low} exceeds high breakpoint {high}"
            )));
        }
        Ok(Breakpoint::Pair(low, high))
    }

    /// Upper bound (inclusive) of the low-regime fit set.
    pub fn low(self) -> f64 {
        match self {
            Breakpoint::Single(s) => s,
            Breakpoint::Pair(lo, _) => lo,
        }
    }

    /// Lower bound (inclusive) of the high-regime fit set.
    pub fn high(self) -> f64 {
        match self {
            Breakpoint::Single(s) => s,
            Breakpoint::Pair(_, hi) => hi,
        }
    }

    pub fn is_finite(self) -> bool {
        self.low().is_finite() && self.high().is_finite()
    }
}

impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breakpoint::Single(s) => write!(f, "{s:.2}"),
            Breakpoint::Pair(lo, hi) => write!(f, "({lo:.2}, {hi:.2})"),
        }
    }
}

/// Ordinary least-squares line over one regime's points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination on the fitted points.
    pub r_squared: f64,
    pub n_points: usize,
}

impl LineFit {
    pub fn predict(&self, temperature: f64) -> f64 {
        self.intercept + self.slope * temperature
    }
}

/// Two regime lines and their intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BilinearResult {
    pub breakpoint: Breakpoint,
    pub low: LineFit,
    pub high: LineFit,
    /// Glass-transition temperature (x of the intersection).
    pub tg: f64,
    /// Specific volume at Tg (y of the intersection).
    pub tg_specific_volume: f64,
}

impl BilinearResult {
    /// Density at Tg (reciprocal of the intersection's specific volume).
    pub fn tg_density(&self) -> f64 {
        1.0 / self.tg_specific_volume
    }
}

/// One scanned candidate of the 2-D search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub breakpoint: f64,
    pub tg: f64,
    pub low_score: f64,
    pub high_score: f64,
}

/// A candidate rejected during the 2-D search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub breakpoint: f64,
    pub reason: String,
}

/// Ordered record of every candidate the 2-D search evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTrace {
    pub records: Vec<SearchRecord>,
    pub skipped: Vec<SkippedCandidate>,
}

/// Outcome of the 1-D fixed-point search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterativeSummary {
    pub breakpoint: f64,
    pub attempts: usize,
    /// `|Tg - guess|` at the final attempt.
    pub last_step: f64,
    pub converged: bool,
}

/// How the breakpoint fed to the final fit is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Grid search optimizing low and high breakpoints independently.
    #[value(name = "auto2d")]
    Auto2d,
    /// Fixed-point iteration on a single symmetric breakpoint.
    #[value(name = "auto1d")]
    Auto1d,
    /// Use the breakpoint(s) supplied by the caller.
    Fixed,
}

impl SplitStrategy {
    pub fn display_name(self) -> &'static str {
        match self {
            SplitStrategy::Auto2d => "auto2d (grid)",
            SplitStrategy::Auto1d => "auto1d (fixed-point)",
            SplitStrategy::Fixed => "fixed",
        }
    }
}

/// What to do when the 1-D search runs out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NonConvergencePolicy {
    /// Report non-convergence as an error.
    Abort,
    /// Fit at the last guess and flag the summary as not converged.
    LastGuess,
}

/// Candidate breakpoints scanned by the 2-D search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateRange {
    /// Every sample temperature except this many at each end.
    Trim(usize),
    /// Explicit ordered candidate list.
    Explicit(Vec<f64>),
}

impl CandidateRange {
    pub fn resolve(&self, series: &SampleSeries) -> Vec<f64> {
        match self {
            CandidateRange::Trim(trim) => series.trimmed_temperatures(*trim),
            CandidateRange::Explicit(values) => values.clone(),
        }
    }
}

/// Fitting configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct TgConfig {
    pub strategy: SplitStrategy,
    /// Breakpoint used by `SplitStrategy::Fixed`.
    pub fixed_breakpoint: Option<Breakpoint>,
    /// Convergence tolerance of the 1-D search (temperature units).
    pub tolerance: f64,
    pub max_attempts: usize,
    pub candidates: CandidateRange,
    pub on_non_convergence: NonConvergencePolicy,
}

impl Default for TgConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Auto2d,
            fixed_breakpoint: None,
            tolerance: 1.0,
            max_attempts: 50,
            candidates: CandidateRange::Trim(10),
            on_non_convergence: NonConvergencePolicy::Abort,
        }
    }
}

/// Presentation and export settings for a run.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub show_trace: bool,
    pub export_trace: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}

/// Final estimate plus the diagnostics of whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TgEstimate {
    pub strategy: SplitStrategy,
    pub result: BilinearResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<SearchTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterative: Option<IterativeSummary>,
}

/// A saved run (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Where the samples came from (file path or synthetic description).
    pub source: String,
    pub series: SampleSeries,
    pub estimate: TgEstimate,
}
