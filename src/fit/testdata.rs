//! Synthetic series shared by the fit tests.

use crate::domain::SampleSeries;

pub const T0: f64 = 380.0;
pub const V0: f64 = 1.0;
pub const SLOPE_LO: f64 = 2e-4;
pub const SLOPE_HI: f64 = 6e-4;

/// Exact bilinear specific volume joined at `T0`, sampled every 10 K on [100, 600].
pub fn exact_bilinear() -> SampleSeries {
    let temps: Vec<f64> = (0..=50).map(|i| 100.0 + 10.0 * i as f64).collect();
    let volumes: Vec<f64> = temps
        .iter()
        .map(|&t| {
            let slope = if t <= T0 { SLOPE_LO } else { SLOPE_HI };
            V0 + slope * (t - T0)
        })
        .collect();
    SampleSeries::from_columns(&temps, &volumes).unwrap()
}

/// A single straight line: both regimes share one slope.
pub fn collinear() -> SampleSeries {
    let temps: Vec<f64> = (0..=20).map(|i| 200.0 + 10.0 * i as f64).collect();
    let volumes: Vec<f64> = temps.iter().map(|&t| 0.9 + 3e-4 * t).collect();
    SampleSeries::from_columns(&temps, &volumes).unwrap()
}

/// Constant specific volume `v` sampled every 10 K on [100, 600].
pub fn flat(v: f64) -> SampleSeries {
    let temps: Vec<f64> = (0..=50).map(|i| 100.0 + 10.0 * i as f64).collect();
    let volumes = vec![v; temps.len()];
    SampleSeries::from_columns(&temps, &volumes).unwrap()
}

/// One line with a negligible slope (`1 + 1e-12 T`) on [100, 600].
pub fn nearly_flat() -> SampleSeries {
    let temps: Vec<f64> = (0..=50).map(|i| 100.0 + 10.0 * i as f64).collect();
    let volumes: Vec<f64> = temps.iter().map(|&t| 1.0 + 1e-12 * t).collect();
    SampleSeries::from_columns(&temps, &volumes).unwrap()
}

/// Noisy series whose fixed-point iteration alternates between Tg ≈ 26.2 and ≈ 36.1.
pub fn oscillating() -> SampleSeries {
    let temps = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0];
    let volumes = [5.7, 1.8, 6.5, 6.3, 1.8, 8.9, 6.6, 1.2];
    SampleSeries::from_columns(&temps, &volumes).unwrap()
}
