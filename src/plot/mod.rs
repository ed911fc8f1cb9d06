//! Terminal plots of fitted sweeps.

pub mod ascii;

pub use ascii::*;
