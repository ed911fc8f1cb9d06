//! `tg-curves` library crate.
//!
//! The binary (`tg`) is a thin wrapper around this library so that:
//!
//! - the fitting core is testable without spawning processes
//! - the bilinear fit can be embedded in other sweep drivers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod sweep;
