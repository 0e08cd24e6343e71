use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::trace::TraceId;
use crate::time::Timestamp;

/// Misfit measurement an adjoint source is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjSrcType {
    #[serde(rename = "waveform_misfit")]
    WaveformMisfit,
    #[serde(rename = "cc_traveltime_misfit")]
    CrossCorrelationTraveltime,
    #[serde(rename = "multitaper_misfit")]
    MultitaperMisfit,
}

impl AdjSrcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjSrcType::WaveformMisfit => "waveform_misfit",
            AdjSrcType::CrossCorrelationTraveltime => "cc_traveltime_misfit",
            AdjSrcType::MultitaperMisfit => "multitaper_misfit",
        }
    }
}

impl fmt::Display for AdjSrcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adjoint source computed for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointSource {
    pub id: TraceId,
    pub adj_src_type: AdjSrcType,
    pub misfit: f64,
    pub starttime: Timestamp,
    /// Sample interval in seconds.
    pub dt: f64,
    pub min_period: f64,
    pub max_period: f64,
    pub data: Vec<f64>,
}

impl AdjointSource {
    pub fn npts(&self) -> usize {
        self.data.len()
    }
}

/// Per-component, per-channel combination weights.
///
/// Outer key is the orientation code, inner key the channel id the windows
/// were picked on. Weights of one component sum to one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelWeights {
    pub components: BTreeMap<char, BTreeMap<String, f64>>,
}

impl ChannelWeights {
    pub fn weight(&self, channel_id: &str) -> Option<f64> {
        self.components
            .values()
            .find_map(|channels| channels.get(channel_id).copied())
    }
}

/// Parameters stored next to each reshaped adjoint trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointRecordParameters {
    pub adjoint_source_type: AdjSrcType,
    pub misfit: f64,
    pub dt: f64,
    pub starttime: Timestamp,
    /// Start of the trace relative to the event origin, in seconds.
    pub time_offset: f64,
    pub station_id: String,
    pub component: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_in_m: f64,
    pub depth_in_m: f64,
    pub units: String,
}

/// One channel of the final output, addressed by `path` inside the output archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointRecord {
    pub path: String,
    pub data: Vec<f64>,
    pub parameters: AdjointRecordParameters,
}

/// Everything a single station contributes to the output archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationAdjoint {
    pub station_id: String,
    pub records: Vec<AdjointRecord>,
}
