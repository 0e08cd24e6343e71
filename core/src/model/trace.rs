use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::{add_seconds, Timestamp};

/// SEED-style identifier `NET.STA.LOC.CHA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraceId {
    pub network: String,
    pub station: String,
    #[serde(default)]
    pub location: String,
    pub channel: String,
}

impl TraceId {
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Self {
        Self {
            network: network.to_string(),
            station: station.to_string(),
            location: location.to_string(),
            channel: channel.to_string(),
        }
    }

    /// Trailing orientation code of the channel (`Z`, `R`, `T`, `N`, `E`, ...).
    pub fn component(&self) -> Option<char> {
        self.channel.chars().last()
    }

    /// Band and instrument codes, i.e. the channel without its orientation.
    pub fn channel_prefix(&self) -> &str {
        let cut = self
            .channel
            .char_indices()
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.channel[..cut]
    }

    pub fn with_channel(&self, channel: String) -> Self {
        Self {
            channel,
            ..self.clone()
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// Timing header of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceStats {
    pub starttime: Timestamp,
    /// Sample interval in seconds.
    pub delta: f64,
    pub npts: usize,
}

impl TraceStats {
    pub fn endtime(&self) -> Timestamp {
        add_seconds(
            self.starttime,
            self.delta * self.npts.saturating_sub(1) as f64,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub stats: TraceStats,
    pub data: Vec<f64>,
}

impl Trace {
    /// Builds a trace whose `npts` always agrees with the sample buffer.
    pub fn new(id: TraceId, starttime: Timestamp, delta: f64, data: Vec<f64>) -> Self {
        let stats = TraceStats {
            starttime,
            delta,
            npts: data.len(),
        };
        Self { id, stats, data }
    }
}

/// Ordered collection of traces sharing a tag within a station group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stream {
    pub traces: Vec<Trace>,
}

impl Stream {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    pub fn first(&self) -> Option<&Trace> {
        self.traces.first()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter()
    }

    /// Traces whose orientation code matches `component`.
    pub fn select_component(&self, component: char) -> impl Iterator<Item = &Trace> {
        self.traces
            .iter()
            .filter(move |trace| trace.id.component() == Some(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn trace_id_splits_channel_codes() {
        let id = TraceId::new("IU", "ANMO", "00", "MXZ");
        assert_eq!(id.component(), Some('Z'));
        assert_eq!(id.channel_prefix(), "MX");
        assert_eq!(id.to_string(), "IU.ANMO.00.MXZ");
    }

    #[test]
    fn stats_endtime_spans_all_samples() {
        let t0 = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let trace = Trace::new(TraceId::new("IU", "ANMO", "", "BHZ"), t0, 0.5, vec![0.0; 11]);
        assert_eq!(trace.stats.npts, 11);
        assert_eq!(trace.stats.endtime(), add_seconds(t0, 5.0));
    }
}
