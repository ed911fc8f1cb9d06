//! Replicate aggregation.
//!
//! A sweep yields, per replicate run, one density trace recorded while the
//! thermostat steps through the temperature list. Each trace is cut into one
//! contiguous block per temperature (all blocks the same length), each block is
//! averaged, and the block mean is inverted to a specific volume. The replicate
//! volumes are then averaged per temperature; their population standard
//! deviation is kept as the reported error bar.

use serde::{Deserialize, Serialize};

use crate::domain::{Sample, SampleSeries};
use crate::error::FitError;

/// Raw density traces from one temperature sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSet {
    /// Temperatures in the order the sweep visited them.
    pub temperatures: Vec<f64>,
    /// One density trace per replicate.
    pub traces: Vec<Vec<f64>>,
}

impl ReplicateSet {
    pub fn new(temperatures: Vec<f64>) -> Self {
        Self {
            temperatures,
            traces: Vec::new(),
        }
    }

    pub fn push_trace(&mut self, densities: Vec<f64>) {
        self.traces.push(densities);
    }

    pub fn replicate_count(&self) -> usize {
        self.traces.len()
    }

    /// Per-temperature specific volume for a single trace, in sweep order.
    pub fn trace_volumes(&self, trace: &[f64]) -> Result<Vec<f64>, FitError> {
        let n_temps = self.temperatures.len();
        if n_temps == 0 {
            return Err(FitError::InvalidSeries("sweep has no temperatures".to_string()));
        }
        if trace.is_empty() || trace.len() % n_temps != 0 {
            return Err(FitError::InvalidSeries(format!(
                "trace of length {} cannot be split into {n_temps} equal temperature blocks",
                trace.len()
            )));
        }

        let block = trace.len() / n_temps;
        trace
            .chunks(block)
            .zip(&self.temperatures)
            .map(|(chunk, &t)| {
                let mean = chunk.iter().sum::<f64>() / chunk.len() as f64;
                if !(mean.is_finite() && mean > 0.0) {
                    return Err(FitError::InvalidSeries(format!(
                        "non-positive mean density {mean} at T={t}"
                    )));
                }
                Ok(1.0 / mean)
            })
            .collect()
    }

    /// Average all replicates into an ascending `SampleSeries`.
    pub fn aggregate(&self) -> Result<SampleSeries, FitError> {
        if self.traces.is_empty() {
            return Err(FitError::InvalidSeries("sweep produced no replicates".to_string()));
        }

        let per_replicate: Vec<Vec<f64>> = self
            .traces
            .iter()
            .map(|trace| self.trace_volumes(trace))
            .collect::<Result<_, _>>()?;

        let n_rep = per_replicate.len() as f64;
        let mut samples: Vec<Sample> = self
            .temperatures
            .iter()
            .enumerate()
            .map(|(i, &temperature)| {
                let mean = per_replicate.iter().map(|v| v[i]).sum::<f64>() / n_rep;
                let var = per_replicate
                    .iter()
                    .map(|v| (v[i] - mean).powi(2))
                    .sum::<f64>()
                    / n_rep;
                Sample {
                    temperature,
                    specific_volume: mean,
                    std_dev: Some(var.sqrt()),
                }
            })
            .collect();

        // Cooling sweeps run high-to-low; fitting wants ascending order.
        samples.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
        SampleSeries::new(samples)
    }
}
