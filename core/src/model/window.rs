use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time::{seconds_between, Timestamp};

/// A time interval selected on an observed/synthetic trace pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub starttime: Timestamp,
    pub endtime: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cc_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc_shift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlna: Option<f64>,
}

impl Window {
    pub fn new(starttime: Timestamp, endtime: Timestamp) -> Self {
        Self {
            starttime,
            endtime,
            max_cc_value: None,
            cc_shift: None,
            dlna: None,
        }
    }

    pub fn duration(&self) -> f64 {
        seconds_between(self.endtime, self.starttime)
    }
}

/// Windows keyed by the channel id (`NET.STA.LOC.CHA`) they were picked on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowSet {
    pub channels: BTreeMap<String, Vec<Window>>,
}

impl WindowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel_id: impl Into<String>, window: Window) {
        self.channels
            .entry(channel_id.into())
            .or_default()
            .push(window);
    }

    /// Total number of windows across every channel.
    pub fn window_count(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// True when no channel carries a window, even if channel keys are present.
    pub fn is_empty(&self) -> bool {
        self.window_count() == 0
    }

    pub fn get(&self, channel_id: &str) -> Option<&[Window]> {
        self.channels.get(channel_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Window>)> {
        self.channels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::add_seconds;
    use chrono::{TimeZone, Utc};

    #[test]
    fn channel_keys_without_windows_count_as_empty() {
        let mut set = WindowSet::new();
        set.channels.insert("IU.ANMO..MXZ".into(), Vec::new());
        assert!(set.is_empty());

        let t0 = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        set.insert("IU.ANMO..MXZ", Window::new(t0, add_seconds(t0, 30.0)));
        assert_eq!(set.window_count(), 1);
        assert_eq!(set.get("IU.ANMO..MXZ").map(|w| w[0].duration()), Some(30.0));
    }
}
