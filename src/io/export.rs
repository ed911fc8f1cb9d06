//! Export the 2-D search trace to CSV.
//!
//! One row per scanned candidate, plus skipped candidates with empty scores,
//! so the R² profiles can be plotted in a spreadsheet.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SearchTrace;
use crate::error::AppError;

/// Write the search trace to a CSV file.
pub fn write_trace_csv(path: &Path, trace: &SearchTrace) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create trace CSV '{}': {e}", path.display())))?;
    write_trace(&mut file, trace)
        .map_err(|e| AppError::new(2, format!("Failed to write trace CSV: {e}")))
}

fn write_trace(out: &mut impl Write, trace: &SearchTrace) -> std::io::Result<()> {
    writeln!(out, "breakpoint,tg,low_r2,high_r2,status")?;
    for r in &trace.records {
        writeln!(
            out,
            "{},{:.6},{:.10},{:.10},ok",
            r.breakpoint, r.tg, r.low_score, r.high_score
        )?;
    }
    for s in &trace.skipped {
        writeln!(out, "{},,,,skipped", s.breakpoint)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SearchRecord, SkippedCandidate};

    #[test]
    fn trace_rows_follow_header() {
        let trace = SearchTrace {
            records: vec![SearchRecord {
                breakpoint: 350.0,
                tg: 380.0,
                low_score: 1.0,
                high_score: 0.5,
            }],
            skipped: vec![SkippedCandidate {
                breakpoint: 100.0,
                reason: "too few".to_string(),
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        write_trace_csv(&path, &trace).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "breakpoint,tg,low_r2,high_r2,status");
        assert_eq!(lines[1], "350,380.000000,1.0000000000,0.5000000000,ok");
        assert_eq!(lines[2], "100,,,,skipped");
    }
}
