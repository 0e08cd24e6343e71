use std::fmt;
use std::path::PathBuf;

/// Which half of a station pair a per-station error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSide {
    Observed,
    Synthetic,
}

impl fmt::Display for DataSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSide::Observed => f.write_str("obsd"),
            DataSide::Synthetic => f.write_str("synt"),
        }
    }
}

/// Descriptor authoring mistakes, raised before any station is touched.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{descriptor} descriptor is missing required keys: {}", .keys.join(", "))]
    MissingKeys {
        descriptor: &'static str,
        keys: Vec<String>,
    },
    #[error("window param components ({}) are inconsistent with configured components ({})", .found.join(", "), .expected.join(", "))]
    ComponentMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error("'{section}' must be a mapping or a path to a YAML file")]
    NotAMapping { section: String },
    #[error("'{section}' is missing 'adj_src_type'")]
    MissingAdjointType { section: String },
    #[error("invalid '{section}': {source}")]
    InvalidSection {
        section: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("reading descriptor {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing descriptor {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures reading or writing archive files.
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error("input archive {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("archive {} holds no events", .0.display())]
    NoEvents(PathBuf),
    #[error("archive io on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive format error in {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

/// Errors reported by the external processing, windowing and adjoint capabilities.
#[derive(thiserror::Error, Debug)]
pub enum CollaboratorError {
    #[error("signal processing failed: {0}")]
    Processing(String),
    #[error("window selection failed: {0}")]
    Windowing(String),
    #[error("adjoint computation failed: {0}")]
    Adjoint(String),
    #[error("adjoint postprocessing failed: {0}")]
    Postprocess(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Top-level error for a preparation run or a single station.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("{side} station group '{station}' missing 'StationXML'")]
    MissingMetadata { side: DataSide, station: String },
    #[error("{side} station group '{station}' missing '{tag}'")]
    MissingTag {
        side: DataSide,
        station: String,
        tag: String,
    },
    #[error("{side} station group '{station}' has an empty '{tag}' stream")]
    EmptyStream {
        side: DataSide,
        station: String,
        tag: String,
    },
    #[error("event '{0}' has no origin")]
    NoOrigin(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
