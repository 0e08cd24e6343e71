use crate::model::{Window, WindowSet};
use crate::prelude::WindowTransform;

/// Drops empty channels, sorts each channel's windows and merges overlaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartWindowTransform;

impl WindowTransform for SmartWindowTransform {
    fn transform(&self, windows: WindowSet) -> WindowSet {
        let mut output = WindowSet::new();
        for (channel, mut picks) in windows.channels {
            picks.retain(|window| window.endtime > window.starttime);
            if picks.is_empty() {
                continue;
            }
            picks.sort_by_key(|window| window.starttime);

            let mut merged: Vec<Window> = Vec::with_capacity(picks.len());
            for window in picks {
                match merged.last_mut() {
                    Some(last) if window.starttime <= last.endtime => {
                        if window.endtime > last.endtime {
                            last.endtime = window.endtime;
                        }
                        // measurements no longer describe the merged span
                        last.max_cc_value = None;
                        last.cc_shift = None;
                        last.dlna = None;
                    }
                    _ => merged.push(window),
                }
            }
            output.channels.insert(channel, merged);
        }
        output
    }
}
