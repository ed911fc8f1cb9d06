//! CSV ingest for exported sweep traces.
//!
//! Turns a `temperature,density[,replicate]` table into clean rows. Schema:
//!
//! - `temperature` (aliases `temp`, `t`): set-point temperature of the row
//! - `density` (alias `rho`): instantaneous density sample
//! - `replicate` (aliases `run`, `replica`, optional): run identifier; rows
//!   without one belong to a single replicate `"0"`
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::AppError;

const DEFAULT_REPLICATE: &str = "0";

/// One validated row.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub temperature: f64,
    pub density: f64,
    pub replicate: String,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated rows plus what was skipped.
#[derive(Debug, Clone)]
pub struct SweepTable {
    pub rows: Vec<SweepRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl SweepTable {
    /// Distinct temperatures in first-seen order.
    pub fn temperatures(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for r in &self.rows {
            if !out.contains(&r.temperature) {
                out.push(r.temperature);
            }
        }
        out
    }

    /// Distinct replicate ids in first-seen order.
    pub fn replicates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.rows {
            if !out.contains(&r.replicate) {
                out.push(r.replicate.clone());
            }
        }
        out
    }
}

/// Read and validate a sweep CSV.
pub fn read_sweep_csv(path: &Path) -> Result<SweepTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let temperature_col = find_column(&header_map, &["temperature", "temp", "t"])
        .ok_or_else(|| AppError::new(2, "CSV is missing a 'temperature' column."))?;
    let density_col = find_column(&header_map, &["density", "rho"])
        .ok_or_else(|| AppError::new(2, "CSV is missing a 'density' column."))?;
    let replicate_col = find_column(&header_map, &["replicate", "run", "replica"]);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, temperature_col, density_col, replicate_col) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!(line = e.line, "skipping CSV row: {}", e.message);
    }
    if rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in sweep CSV."));
    }
    debug!(rows_read, rows_used = rows.len(), "sweep CSV loaded");

    Ok(SweepTable {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn parse_row(
    record: &StringRecord,
    temperature_col: usize,
    density_col: usize,
    replicate_col: Option<usize>,
) -> Result<SweepRow, String> {
    let temperature = parse_f64(record, temperature_col, "temperature")?;
    let density = parse_f64(record, density_col, "density")?;
    if density <= 0.0 {
        return Err(format!("density must be > 0, got {density}"));
    }
    let replicate = replicate_col
        .and_then(|c| record.get(c))
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REPLICATE)
        .to_string();

    Ok(SweepRow {
        temperature,
        density,
        replicate,
    })
}

fn parse_f64(record: &StringRecord, col: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing {name}"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {name} '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {name} '{raw}'"));
    }
    Ok(value)
}
