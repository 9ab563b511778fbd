//! Synthetic dataset generators for tests and examples.
//!
//! All generators label rows `0..n` and return the feature table together
//! with a target aligned on the same index.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::frame::{Frame, Series};

/// A strictly increasing ramp: `x[t] = t`, target equals the feature.
pub fn monotonic_ramp(rows: usize) -> (Frame, Series) {
    let index: Vec<i64> = (0..rows as i64).collect();
    let values: Vec<f64> = index.iter().map(|&i| i as f64).collect();
    (
        Frame::single("ramp", index.clone(), values.clone()),
        Series::new("y", index, values),
    )
}

/// A sine wave with the given period in rows.
pub fn sine_wave(rows: usize, period: f64) -> (Frame, Series) {
    let index: Vec<i64> = (0..rows as i64).collect();
    let values: Vec<f64> = index
        .iter()
        .map(|&i| (i as f64 * std::f64::consts::TAU / period).sin())
        .collect();
    (
        Frame::single("sine", index.clone(), values.clone()),
        Series::new("y", index, values),
    )
}

/// Deterministic uniform noise in `[-1, 1)`.
pub fn seeded_noise(rows: usize, seed: u64) -> (Frame, Series) {
    let mut rng = StdRng::seed_from_u64(seed);
    let index: Vec<i64> = (0..rows as i64).collect();
    let values: Vec<f64> = (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect();
    (
        Frame::single("noise", index.clone(), values.clone()),
        Series::new("y", index, values),
    )
}
