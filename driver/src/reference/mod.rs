//! Lightweight stand-ins for the processing, windowing and adjoint libraries,
//! good enough to drive the pipeline end to end on the demo dataset.

pub mod misfit;
pub mod processor;
pub mod selector;

use adjcore::prelude::Toolkit;
use std::sync::Arc;

pub use misfit::WaveformMisfitCalculator;
pub use processor::CutProcessor;
pub use selector::EnergyWindowSelector;

pub fn reference_toolkit() -> Toolkit {
    Toolkit::new(
        Arc::new(CutProcessor),
        Arc::new(EnergyWindowSelector),
        Arc::new(WaveformMisfitCalculator),
    )
}
