pub mod profile;

pub use profile::{generate_dataset, DemoConfig};
