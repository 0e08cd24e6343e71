use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trace::Stream;

/// Instrument and site description of a station (the StationXML payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMetadata {
    pub network: String,
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation_m: f64,
    #[serde(default)]
    pub local_depth_m: f64,
    #[serde(default)]
    pub channels: Vec<ChannelMetadata>,
}

impl StationMetadata {
    /// `NET.STA` identifier.
    pub fn station_id(&self) -> String {
        format!("{}.{}", self.network, self.station)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    #[serde(default)]
    pub location: String,
    pub code: String,
    #[serde(default)]
    pub azimuth: f64,
    #[serde(default)]
    pub dip: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
}

/// Read-only view over one station's content inside an archive.
///
/// The pipeline only ever asks for capabilities through this trait, so any
/// archive backend can expose its stations without copying them.
pub trait StationGroup: Sync {
    fn station_name(&self) -> &str;

    fn metadata(&self) -> Option<&StationMetadata>;

    fn tagged_stream(&self, tag: &str) -> Option<&Stream>;

    fn has_metadata(&self) -> bool {
        self.metadata().is_some()
    }

    fn has_tagged_stream(&self, tag: &str) -> bool {
        self.tagged_stream(tag).is_some()
    }
}

/// Owned station group, the serialized form used by file-backed archives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StationMetadata>,
    #[serde(default)]
    pub streams: BTreeMap<String, Stream>,
}

impl StationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: StationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_stream(mut self, tag: impl Into<String>, stream: Stream) -> Self {
        self.streams.insert(tag.into(), stream);
        self
    }
}

impl StationGroup for StationRecord {
    fn station_name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> Option<&StationMetadata> {
        self.metadata.as_ref()
    }

    fn tagged_stream(&self, tag: &str) -> Option<&Stream> {
        self.streams.get(tag)
    }
}
