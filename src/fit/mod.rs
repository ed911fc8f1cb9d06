//! Bilinear Tg fitting.
//!
//! Responsibilities:
//!
//! - fit the two regime lines at a given breakpoint and intersect them (`bilinear`)
//! - choose breakpoints by grid search (`grid`) or fixed-point iteration (`iterative`)
//! - dispatch on the configured strategy and produce the final estimate (`estimate`)

pub mod bilinear;
pub mod estimate;
pub mod grid;
pub mod iterative;

#[cfg(test)]
pub(crate) mod testdata;

pub use bilinear::*;
pub use estimate::*;
pub use grid::*;
pub use iterative::*;
