pub mod postprocess;
pub mod reshape;
pub mod station;
pub mod weights;
pub mod windows;

pub use postprocess::StandardPostprocessor;
pub use reshape::reshape_adjoint;
pub use station::{check_station_pair, process_station, StationContext};
pub use weights::calculate_channel_weights;
pub use windows::SmartWindowTransform;
