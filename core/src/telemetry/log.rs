use log::{info, warn};
use serde::Serialize;

/// Thin wrapper over the `log` facade for run-level reporting.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    /// Dumps a descriptor or config block under a banner.
    pub fn print_info<T: Serialize>(&self, title: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(body) => info!("==== {} ====\n{}", title, body),
            Err(err) => warn!("==== {} ==== (not printable: {})", title, err),
        }
    }

    pub fn record_station(&self, station: &str, outcome: &str) {
        info!("[{}] {}", station, outcome);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
