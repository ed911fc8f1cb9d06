//! Input/output helpers.
//!
//! - sweep CSV ingest + validation (`ingest`)
//! - search trace export (CSV) (`export`)
//! - report JSON read/write (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
