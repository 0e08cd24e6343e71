use log::info;
use std::fs;
use std::path::Path;

use crate::error::ArchiveError;
use crate::model::{Event, StationAdjoint, StationGroup};

/// Read-only waveform archive: an event catalog plus tag-addressable station groups.
pub trait Archive: Sync {
    fn path(&self) -> &Path;

    fn events(&self) -> &[Event];

    fn station_names(&self) -> Vec<String>;

    fn station(&self, name: &str) -> Option<&dyn StationGroup>;
}

/// Opens archives for reading.
pub trait ArchiveReader {
    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError>;
}

/// Persists the collected station results of one run.
pub trait OutputWriter: Sync {
    fn write(&self, output: &Path, event: &Event, results: &[StationAdjoint]) -> Result<(), ArchiveError>;
}

pub fn check_input_file(path: &Path) -> Result<(), ArchiveError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArchiveError::MissingInput(path.to_path_buf()))
    }
}

/// Removes a stale output file and makes sure its directory exists.
pub fn check_output_file(path: &Path) -> Result<(), ArchiveError> {
    let io_error = |source: std::io::Error| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() {
        info!("output file {} exists and will be overwritten", path.display());
        fs::remove_file(path).map_err(io_error)?;
    }
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    Ok(())
}
