//! Raw descriptor handling: loading, required-key checks and sub-section resolution.
//!
//! Path descriptors are conventionally JSON and parameter descriptors YAML;
//! both go through `serde_yaml`, which accepts JSON as a YAML subset.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// A parsed descriptor plus the directory relative sub-descriptor paths resolve against.
#[derive(Debug, Clone)]
pub struct Descriptor {
    value: Value,
    base_dir: Option<PathBuf>,
}

impl Descriptor {
    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            base_dir: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let value = read_yaml(path)?;
        Ok(Self {
            value,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let value = serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Ok(Self::from_value(value))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Top-level mapping of the descriptor.
    pub fn mapping(&self, name: &'static str) -> Result<&Mapping, ConfigError> {
        self.value.as_mapping().ok_or(ConfigError::NotAMapping {
            section: name.to_string(),
        })
    }

    /// Resolves a top-level section that is either inline or a path to another YAML file.
    pub fn section(&self, key: &str) -> Result<Mapping, ConfigError> {
        let value = self
            .value
            .get(key)
            .ok_or_else(|| ConfigError::MissingKeys {
                descriptor: "param",
                keys: vec![key.to_string()],
            })?;
        resolve_section(key, value, self.base_dir())
    }
}

fn read_yaml(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Inline mappings are copied; strings are treated as YAML file paths.
pub fn resolve_section(
    section: &str,
    value: &Value,
    base_dir: Option<&Path>,
) -> Result<Mapping, ConfigError> {
    match value {
        Value::Mapping(mapping) => Ok(mapping.clone()),
        Value::String(file) => {
            let file = Path::new(file);
            let path = match base_dir {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file.to_path_buf(),
            };
            match read_yaml(&path)? {
                Value::Mapping(mapping) => Ok(mapping),
                _ => Err(ConfigError::NotAMapping {
                    section: section.to_string(),
                }),
            }
        }
        _ => Err(ConfigError::NotAMapping {
            section: section.to_string(),
        }),
    }
}

/// Keys from `required` absent in `mapping`, in the order they were listed.
pub fn missing_keys(required: &[&str], mapping: &Mapping) -> Vec<String> {
    required
        .iter()
        .filter(|key| !mapping.contains_key(**key))
        .map(|key| key.to_string())
        .collect()
}

pub fn require_keys(
    descriptor: &'static str,
    required: &[&str],
    mapping: &Mapping,
) -> Result<(), ConfigError> {
    let keys = missing_keys(required, mapping);
    if keys.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys { descriptor, keys })
    }
}

/// String keys of a mapping; non-string keys are rendered through YAML.
pub fn mapping_keys(mapping: &Mapping) -> Vec<String> {
    mapping
        .keys()
        .map(|key| match key {
            Value::String(name) => name.clone(),
            other => serde_yaml::to_string(other)
                .map(|text| text.trim().to_string())
                .unwrap_or_default(),
        })
        .collect()
}
