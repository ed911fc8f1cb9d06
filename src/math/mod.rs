//! Mathematical utilities: least squares lines and their intersection.

pub mod ols;

pub use ols::*;
