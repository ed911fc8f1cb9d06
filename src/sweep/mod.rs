//! Temperature-sweep collaborators.
//!
//! The fitting core never talks to a simulation engine. Anything that can
//! "run a temperature sweep and hand back density traces" implements
//! [`TemperatureSweep`]:
//!
//! - [`CsvSweep`] replays traces exported to a CSV table
//! - [`SyntheticSweep`] generates seeded noisy traces around a known Tg

pub mod replicates;
pub mod synthetic;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::AppError;
use crate::io::ingest::{SweepTable, read_sweep_csv};

pub use replicates::*;
pub use synthetic::*;

/// Capability: run a temperature sweep and return the raw replicate traces.
pub trait TemperatureSweep {
    /// `temperatures` is the order in which the thermostat visits each set point.
    fn run_sweep(&self, temperatures: &[f64]) -> Result<ReplicateSet, AppError>;
}

/// Sweep backed by a `temperature,density[,replicate]` CSV table.
#[derive(Debug, Clone)]
pub struct CsvSweep {
    pub path: PathBuf,
    table: SweepTable,
}

impl CsvSweep {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let table = read_sweep_csv(&path)?;
        Ok(Self { path, table })
    }

    pub fn table(&self) -> &SweepTable {
        &self.table
    }

    /// Distinct temperatures in first-seen order.
    pub fn temperatures(&self) -> Vec<f64> {
        self.table.temperatures()
    }

    /// Density samples keyed by `(replicate, temperature)`, in file order.
    fn blocks(&self) -> HashMap<(&str, u64), Vec<f64>> {
        let mut blocks: HashMap<(&str, u64), Vec<f64>> = HashMap::new();
        for r in &self.table.rows {
            blocks
                .entry((r.replicate.as_str(), temperature_key(r.temperature)))
                .or_default()
                .push(r.density);
        }
        blocks
    }
}

/// Hash key for a set-point temperature (`-0.0` and `0.0` share a key).
fn temperature_key(t: f64) -> u64 {
    (t + 0.0).to_bits()
}

impl TemperatureSweep for CsvSweep {
    fn run_sweep(&self, temperatures: &[f64]) -> Result<ReplicateSet, AppError> {
        let mut set = ReplicateSet::new(temperatures.to_vec());
        let blocks = self.blocks();

        for replicate in self.table.replicates() {
            let mut trace = Vec::new();
            let mut block_len: Option<usize> = None;

            for &t in temperatures {
                let block = match blocks.get(&(replicate.as_str(), temperature_key(t))) {
                    Some(block) => block,
                    None => {
                        return Err(AppError::new(
                            3,
                            format!("Replicate '{replicate}' has no rows at T={t}."),
                        ));
                    }
                };
                match block_len {
                    Some(n) if n != block.len() => {
                        return Err(AppError::new(
                            3,
                            format!(
                                "Replicate '{replicate}' has {} rows at T={t}, expected {n}.",
                                block.len()
                            ),
                        ));
                    }
                    _ => block_len = Some(block.len()),
                }
                trace.extend_from_slice(block);
            }
            set.push_trace(trace);
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_sweep_groups_rows_by_replicate_and_temperature() {
        let file = write_csv(
            "temperature,density,replicate\n\
             400,0.5,a\n400,0.5,a\n300,1.0,a\n300,1.0,a\n\
             400,0.25,b\n400,0.25,b\n300,0.5,b\n300,0.5,b\n\
             200,1.0,a\n200,1.0,a\n100,1.0,a\n100,1.0,a\n\
             200,0.5,b\n200,0.5,b\n100,0.5,b\n100,0.5,b\n",
        );
        let sweep = CsvSweep::open(file.path()).unwrap();
        let temps = sweep.temperatures();
        assert_eq!(temps, vec![400.0, 300.0, 200.0, 100.0]);

        let set = sweep.run_sweep(&temps).unwrap();
        assert_eq!(set.replicate_count(), 2);
        assert_eq!(set.traces[0], vec![0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        let series = set.aggregate().unwrap();
        assert_eq!(series.samples()[3].specific_volume, 3.0);
        assert_eq!(series.samples()[0].specific_volume, 1.5);
    }

    #[test]
    fn interleaved_rows_keep_file_order_within_each_block() {
        let file = write_csv(
            "temperature,density,replicate\n\
             0,0.5,a\n-0,0.25,a\n10,1.0,a\n0,0.5,b\n10,0.5,a\n\
             0,0.25,b\n10,0.5,b\n20,1.0,a\n30,1.0,a\n10,0.5,b\n\
             20,1.0,a\n20,0.5,b\n20,0.5,b\n30,1.0,a\n30,0.5,b\n30,0.5,b\n",
        );
        let sweep = CsvSweep::open(file.path()).unwrap();
        let set = sweep.run_sweep(&[0.0, 10.0, 20.0, 30.0]).unwrap();

        assert_eq!(set.replicate_count(), 2);
        assert_eq!(set.traces[0], vec![0.5, 0.25, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(set.traces[1], vec![0.5, 0.25, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn unequal_blocks_are_rejected() {
        let file = write_csv("temperature,density\n1,1\n1,1\n2,1\n3,1\n4,1\n");
        let sweep = CsvSweep::open(file.path()).unwrap();
        let err = sweep.run_sweep(&sweep.temperatures()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_temperature_is_rejected() {
        let file = write_csv("temperature,density\n1,1\n2,1\n3,1\n4,1\n");
        let sweep = CsvSweep::open(file.path()).unwrap();
        assert!(sweep.run_sweep(&[1.0, 2.0, 3.0, 5.0]).is_err());
    }
}
