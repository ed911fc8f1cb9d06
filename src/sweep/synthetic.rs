//! Seeded synthetic temperature sweep.
//!
//! Stands in for the molecular-dynamics engine: the "true" specific volume is
//! bilinear in temperature with a known Tg, and each thermo sample adds
//! Gaussian noise to the corresponding density.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::error::AppError;
use crate::sweep::{ReplicateSet, TemperatureSweep};

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSweep {
    /// True glass-transition temperature (K).
    pub tg: f64,
    /// Specific volume at `tg`.
    pub volume_at_tg: f64,
    /// dv/dT below `tg` (glassy expansion).
    pub glassy_slope: f64,
    /// dv/dT above `tg` (rubbery/melt expansion).
    pub rubbery_slope: f64,
    /// Standard deviation of each density sample.
    pub density_noise: f64,
    /// Thermo samples recorded per temperature.
    pub samples_per_temperature: usize,
    pub replicates: usize,
    pub seed: u64,
}

impl Default for SyntheticSweep {
    fn default() -> Self {
        Self {
            tg: 380.0,
            volume_at_tg: 1.0,
            glassy_slope: 2.0e-4,
            rubbery_slope: 6.0e-4,
            density_noise: 2.0e-3,
            samples_per_temperature: 10,
            replicates: 3,
            seed: 42,
        }
    }
}

impl SyntheticSweep {
    /// Noise-free specific volume at `temperature`.
    pub fn specific_volume(&self, temperature: f64) -> f64 {
        let slope = if temperature <= self.tg {
            self.glassy_slope
        } else {
            self.rubbery_slope
        };
        self.volume_at_tg + slope * (temperature - self.tg)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.replicates == 0 || self.samples_per_temperature == 0 {
            return Err(AppError::new(
                2,
                "Replicates and samples per temperature must be > 0.",
            ));
        }
        if !(self.density_noise.is_finite() && self.density_noise >= 0.0) {
            return Err(AppError::new(2, "Density noise must be finite and >= 0."));
        }
        if !(self.tg.is_finite()
            && self.volume_at_tg.is_finite()
            && self.glassy_slope.is_finite()
            && self.rubbery_slope.is_finite())
        {
            return Err(AppError::new(2, "Synthetic curve parameters must be finite."));
        }
        Ok(())
    }
}

impl TemperatureSweep for SyntheticSweep {
    fn run_sweep(&self, temperatures: &[f64]) -> Result<ReplicateSet, AppError> {
        self.validate()?;

        let normal = Normal::new(0.0, self.density_noise)
            .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

        let mut set = ReplicateSet::new(temperatures.to_vec());
        for replicate in 0..self.replicates {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(replicate as u64));
            let mut trace = Vec::with_capacity(temperatures.len() * self.samples_per_temperature);

            for &t in temperatures {
                let volume = self.specific_volume(t);
                if !(volume.is_finite() && volume > 0.0) {
                    return Err(AppError::new(
                        2,
                        format!("Synthetic specific volume is non-positive at T={t}."),
                    ));
                }
                let density = 1.0 / volume;
                for _ in 0..self.samples_per_temperature {
                    trace.push(density + normal.sample(&mut rng));
                }
            }
            debug!(replicate, n = trace.len(), "synthetic replicate generated");
            set.push_trace(trace);
        }
        Ok(set)
    }
}
