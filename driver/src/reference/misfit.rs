use adjcore::config::AdjointConfig;
use adjcore::error::CollaboratorError;
use adjcore::math::interpolate_onto;
use adjcore::model::{AdjSrcType, AdjointSource, Stream, Window, WindowSet};
use adjcore::prelude::{AdjointCalculator, CollaboratorResult, FigureOptions};
use adjcore::time::seconds_between;
use std::f64::consts::PI;

/// L2 waveform-difference adjoint sources, tapered inside each window.
#[derive(Debug, Default)]
pub struct WaveformMisfitCalculator;

impl AdjointCalculator for WaveformMisfitCalculator {
    fn calculate(
        &self,
        observed: &Stream,
        synthetic: &Stream,
        windows: &WindowSet,
        config: &AdjointConfig,
        adj_src_type: AdjSrcType,
        _figure: &FigureOptions,
    ) -> CollaboratorResult<Vec<AdjointSource>> {
        if adj_src_type != AdjSrcType::WaveformMisfit {
            return Err(CollaboratorError::Unsupported(format!(
                "adjoint source type '{adj_src_type}'"
            )));
        }

        let mut sources = Vec::new();
        for synt in synthetic.iter() {
            let Some(channel_windows) = windows.get(&synt.id.to_string()) else {
                continue;
            };
            if channel_windows.is_empty() {
                continue;
            }
            let obsd = synt
                .id
                .component()
                .and_then(|component| observed.select_component(component).next())
                .ok_or_else(|| {
                    CollaboratorError::Adjoint(format!("no observed trace matching {}", synt.id))
                })?;
            let obsd_data = interpolate_onto(&obsd.data, obsd.stats.starttime, obsd.stats.delta, &synt.stats);

            let delta = synt.stats.delta;
            let mut data = vec![0.0; synt.data.len()];
            let mut misfit = 0.0;
            for window in channel_windows {
                let (first, last) = window_samples(window, synt.stats.starttime, delta, data.len());
                let taper = window_taper(last - first, config.taper_percentage);
                for (offset, index) in (first..last).enumerate() {
                    let diff = (synt.data[index] - obsd_data[index]) * taper[offset];
                    data[index] = diff;
                    misfit += 0.5 * diff * diff * delta;
                }
            }

            sources.push(AdjointSource {
                id: synt.id.clone(),
                adj_src_type,
                misfit,
                starttime: synt.stats.starttime,
                dt: delta,
                min_period: config.min_period,
                max_period: config.max_period,
                data,
            });
        }
        Ok(sources)
    }
}

fn window_samples(
    window: &Window,
    starttime: adjcore::time::Timestamp,
    delta: f64,
    npts: usize,
) -> (usize, usize) {
    let first = (seconds_between(window.starttime, starttime) / delta).round().max(0.0) as usize;
    let last = (seconds_between(window.endtime, starttime) / delta).round().max(0.0) as usize + 1;
    (first.min(npts), last.min(npts).max(first.min(npts)))
}

/// Cosine taper rising over `percentage / 2` of the window at each end.
fn window_taper(len: usize, percentage: f64) -> Vec<f64> {
    let ramp = ((len as f64) * percentage.clamp(0.0, 1.0) / 2.0).floor() as usize;
    (0..len)
        .map(|index| {
            let edge = index.min(len - 1 - index);
            if edge >= ramp {
                1.0
            } else {
                0.5 * (1.0 - (PI * edge as f64 / ramp as f64).cos())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjcore::model::{Trace, TraceId};
    use adjcore::time::add_seconds;
    use chrono::{TimeZone, Utc};

    fn config() -> AdjointConfig {
        serde_yaml::from_str("min_period: 27.0\nmax_period: 60.0\ntaper_percentage: 0.0\n").unwrap()
    }

    fn stream(value: f64) -> Stream {
        let t0 = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        Stream::new(vec![Trace::new(
            TraceId::new("IU", "ANMO", "", "MXZ"),
            t0,
            1.0,
            vec![value; 100],
        )])
    }

    #[test]
    fn difference_is_confined_to_windows() {
        let synthetic = stream(2.0);
        let observed = stream(1.5);
        let start = synthetic.traces[0].stats.starttime;
        let mut windows = WindowSet::new();
        windows.insert(
            "IU.ANMO..MXZ",
            Window::new(add_seconds(start, 10.0), add_seconds(start, 19.0)),
        );

        let sources = WaveformMisfitCalculator
            .calculate(
                &observed,
                &synthetic,
                &windows,
                &config(),
                AdjSrcType::WaveformMisfit,
                &FigureOptions::disabled(),
            )
            .unwrap();
        assert_eq!(sources.len(), 1);
        let source = &sources[0];
        assert_eq!(source.data.len(), 100);
        assert_eq!(source.data[9], 0.0);
        assert_eq!(source.data[10], 0.5);
        assert_eq!(source.data[19], 0.5);
        assert_eq!(source.data[20], 0.0);
        // ten samples of 0.5 * 0.25 * dt
        assert!((source.misfit - 1.25).abs() < 1e-12);
    }

    #[test]
    fn other_measurements_are_unsupported() {
        let err = WaveformMisfitCalculator
            .calculate(
                &stream(1.0),
                &stream(1.0),
                &WindowSet::new(),
                &config(),
                AdjSrcType::MultitaperMisfit,
                &FigureOptions::disabled(),
            )
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Unsupported(_)));
    }
}
