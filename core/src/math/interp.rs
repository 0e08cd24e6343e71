use crate::model::TraceStats;
use crate::time::{seconds_between, Timestamp};

/// Linearly resamples `data` (starting at `starttime`, spaced `delta`) onto `target`.
///
/// Target samples outside the source span are zero.
pub fn interpolate_onto(data: &[f64], starttime: Timestamp, delta: f64, target: &TraceStats) -> Vec<f64> {
    let mut output = vec![0.0; target.npts];
    if data.is_empty() || delta <= 0.0 {
        return output;
    }
    let offset = seconds_between(target.starttime, starttime);
    let last = (data.len() - 1) as f64;

    for (index, sample) in output.iter_mut().enumerate() {
        let position = (offset + index as f64 * target.delta) / delta;
        if position < 0.0 || position > last {
            continue;
        }
        let lower = position.floor() as usize;
        let frac = position - lower as f64;
        *sample = if lower + 1 < data.len() {
            data[lower] * (1.0 - frac) + data[lower + 1] * frac
        } else {
            data[lower]
        };
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::add_seconds;
    use chrono::{TimeZone, Utc};

    #[test]
    fn resamples_ramp_and_zero_pads() {
        let t0 = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let ramp = [0.0, 1.0, 2.0, 3.0];
        let target = TraceStats {
            starttime: add_seconds(t0, -0.5),
            delta: 0.5,
            npts: 9,
        };
        let output = interpolate_onto(&ramp, t0, 1.0, &target);
        assert_eq!(output, vec![0.0, 0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 0.0]);
    }
}
