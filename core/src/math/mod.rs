pub mod fft;
pub mod interp;
pub mod matrix;
pub mod stats;

pub use fft::FftHelper;
pub use interp::interpolate_onto;
pub use matrix::MatrixHelper;
pub use stats::StatsHelper;
