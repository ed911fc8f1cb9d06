//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated `(temperature, specific volume)` series (`SampleSeries`)
//! - breakpoints and the per-regime line fits (`Breakpoint`, `LineFit`, `BilinearResult`)
//! - search diagnostics and run configuration (`SearchTrace`, `TgConfig`, `TgReport`)

pub mod types;

pub use types::*;
