use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A candidate source location/time hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub time: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_km: Option<f64>,
}

/// Seismic source metadata as stored in an archive's event catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub resource_id: String,
    pub origins: Vec<Origin>,
    /// Index into `origins` of the preferred hypothesis, when one is flagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_origin: Option<usize>,
}

impl Event {
    pub fn new(resource_id: impl Into<String>, origins: Vec<Origin>) -> Self {
        Self {
            resource_id: resource_id.into(),
            origins,
            preferred_origin: None,
        }
    }

    pub fn preferred_origin(&self) -> Option<&Origin> {
        self.preferred_origin
            .and_then(|index| self.origins.get(index))
    }

    /// Origin used for event-relative computations: the preferred one, else the first listed.
    pub fn reference_origin(&self) -> Option<&Origin> {
        self.preferred_origin().or_else(|| self.origins.first())
    }
}
