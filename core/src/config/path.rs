use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::descriptor::{require_keys, Descriptor};
use crate::error::ConfigError;

pub const PATH_KEYS: [&str; 7] = [
    "obsd_asdf",
    "obsd_tag",
    "synt_asdf",
    "synt_tag",
    "output_asdf",
    "figure_mode",
    "figure_dir",
];

/// File locations and waveform tags for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub obsd_asdf: PathBuf,
    pub obsd_tag: String,
    pub synt_asdf: PathBuf,
    pub synt_tag: String,
    pub output_asdf: PathBuf,
    pub figure_mode: bool,
    pub figure_dir: Option<PathBuf>,
}

impl PathDescriptor {
    /// Checks the required keys, then deserializes. Relative file paths are
    /// resolved against the descriptor's own directory.
    pub fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConfigError> {
        let mapping = descriptor.mapping("path")?;
        require_keys("path", &PATH_KEYS, mapping)?;
        let mut path: PathDescriptor = serde_yaml::from_value(descriptor.value().clone())
            .map_err(|source| ConfigError::InvalidSection {
                section: "path".to_string(),
                source,
            })?;
        if let Some(base) = descriptor.base_dir() {
            path.rebase(base);
        }
        Ok(path)
    }

    fn rebase(&mut self, base: &Path) {
        for file in [
            &mut self.obsd_asdf,
            &mut self.synt_asdf,
            &mut self.output_asdf,
        ] {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
        if let Some(dir) = self.figure_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}
