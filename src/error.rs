use thiserror::Error;

use crate::domain::Regime;

/// Errors raised by the fitting core.
///
/// These never print anything themselves; the binary maps them onto
/// [`AppError`] exit codes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Invalid sample series: {0}")]
    InvalidSeries(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data in the {side} regime: {found} point(s), need at least 2")]
    InsufficientData { side: Regime, found: usize },

    #[error("Fitted regime lines are parallel (slope_lo={slope_lo:.6e}, slope_hi={slope_hi:.6e}); no Tg exists")]
    SingularFit { slope_lo: f64, slope_hi: f64 },

    #[error("No candidate breakpoint produced a valid fit ({candidates} candidate(s) scanned)")]
    EmptySearch { candidates: usize },

    /// `last_guess` is the breakpoint fitted on the final attempt and
    /// `last_tg` the Tg that fit produced.
    #[error(
        "Split search did not converge to within {tolerance} after {attempts} attempt(s) (last guess {last_guess:.3}, last Tg {last_tg:.3})"
    )]
    NonConvergence {
        attempts: usize,
        tolerance: f64,
        last_guess: f64,
        last_tg: f64,
    },
}

impl FitError {
    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidSeries(_) | FitError::InvalidParameter(_) => 2,
            FitError::InsufficientData { .. } | FitError::EmptySearch { .. } => 3,
            FitError::SingularFit { .. } | FitError::NonConvergence { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
