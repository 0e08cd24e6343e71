use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Helper that wraps the `rustfft` planner for a forward/inverse pair of one size.
pub struct FftHelper {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            forward,
            inverse,
            size,
        }
    }

    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .map(|&value| Complex64::new(value, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::zero());
        self.forward.process(&mut buffer);
        buffer
    }

    /// Inverse transform, normalized so `inverse(forward(x)) == x`.
    pub fn inverse(&self, spectrum: &[Complex64]) -> Vec<f64> {
        let mut buffer = spectrum.to_vec();
        buffer.resize(self.size, Complex64::zero());
        self.inverse.process(&mut buffer);
        let scale = 1.0 / self.size.max(1) as f64;
        buffer.iter().map(|value| value.re * scale).collect()
    }
}

/// Cosine taper defined by four corner frequencies `f1 <= f2 <= f3 <= f4`.
pub fn cosine_taper(frequency: f64, corners: [f64; 4]) -> f64 {
    let [f1, f2, f3, f4] = corners;
    if frequency <= f1 || frequency >= f4 {
        0.0
    } else if frequency < f2 {
        0.5 * (1.0 - (PI * (frequency - f1) / (f2 - f1)).cos())
    } else if frequency <= f3 {
        1.0
    } else {
        0.5 * (1.0 + (PI * (frequency - f3) / (f4 - f3)).cos())
    }
}

/// Band-limits `data` with the pre-filter taper applied in the frequency domain.
pub fn apply_pre_filter(data: &[f64], delta: f64, corners: [f64; 4]) -> Vec<f64> {
    if data.is_empty() || delta <= 0.0 {
        return data.to_vec();
    }
    let size = data.len().next_power_of_two() * 2;
    let helper = FftHelper::new(size);
    let mut spectrum = helper.forward(data);
    let df = 1.0 / (size as f64 * delta);

    for (index, value) in spectrum.iter_mut().enumerate() {
        // negative frequencies mirror the positive half
        let bin = if index <= size / 2 { index } else { size - index };
        *value *= cosine_taper(bin as f64 * df, corners);
    }

    let mut filtered = helper.inverse(&spectrum);
    filtered.truncate(data.len());
    filtered
}
