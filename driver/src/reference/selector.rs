use adjcore::config::{WindowConfig, WindowConfigs};
use adjcore::error::CollaboratorError;
use adjcore::math::{interpolate_onto, StatsHelper};
use adjcore::model::{Stream, Trace, Window, WindowSet};
use adjcore::prelude::{CollaboratorResult, WindowContext, WindowSelector};
use adjcore::time::add_seconds;
use log::{debug, warn};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;

/// Picks windows where the synthetic envelope rises above the water level and
/// the observed trace correlates well enough with the synthetic.
#[derive(Debug, Default)]
pub struct EnergyWindowSelector;

#[derive(Serialize)]
struct WindowDiagnostic<'a> {
    station: String,
    windows: &'a WindowSet,
}

impl WindowSelector for EnergyWindowSelector {
    fn select(
        &self,
        observed: &Stream,
        synthetic: &Stream,
        configs: &WindowConfigs,
        context: WindowContext<'_>,
    ) -> CollaboratorResult<WindowSet> {
        let mut windows = WindowSet::new();
        for synt in synthetic.iter() {
            let Some(component) = synt.id.component() else {
                continue;
            };
            let Some(config) = configs.get(&component.to_string()) else {
                continue;
            };
            let Some(obsd) = observed.select_component(component).next() else {
                warn!("{}: no observed trace for component {}", synt.id, component);
                continue;
            };
            let channel_id = synt.id.to_string();
            let picked = pick_windows(obsd, synt, config);
            if context.verbose {
                debug!("{}: {} window(s)", channel_id, picked.len());
            }
            windows.channels.insert(channel_id, picked);
        }

        let station_id = context.station.station_id();
        if let Some(path) = context.figure.figure_path(&station_id, "windows", "json") {
            let file = File::create(&path).map_err(|err| {
                CollaboratorError::Windowing(format!("writing {}: {}", path.display(), err))
            })?;
            let diagnostic = WindowDiagnostic {
                station: station_id,
                windows: &windows,
            };
            serde_json::to_writer_pretty(BufWriter::new(file), &diagnostic)
                .map_err(|err| CollaboratorError::Windowing(err.to_string()))?;
        }
        Ok(windows)
    }
}

fn pick_windows(obsd: &Trace, synt: &Trace, config: &WindowConfig) -> Vec<Window> {
    let delta = synt.stats.delta;
    let envelope = smoothed_envelope(&synt.data, (config.min_period / delta).round() as usize);
    let threshold = config.stalta_waterlevel * StatsHelper::max_abs(&envelope);
    if threshold <= 0.0 {
        return Vec::new();
    }
    let observed = interpolate_onto(&obsd.data, obsd.stats.starttime, obsd.stats.delta, &synt.stats);
    let min_samples = (config.min_period / delta).ceil() as usize;

    let mut windows = Vec::new();
    let mut start = None;
    for index in 0..=envelope.len() {
        let above = index < envelope.len() && envelope[index] > threshold;
        match (above, start) {
            (true, None) => start = Some(index),
            (false, Some(first)) => {
                start = None;
                if index - first < min_samples.max(2) {
                    continue;
                }
                let cc = StatsHelper::correlation(&observed[first..index], &synt.data[first..index]);
                if cc < config.cc_acceptance_level {
                    continue;
                }
                let mut window = Window::new(
                    add_seconds(synt.stats.starttime, first as f64 * delta),
                    add_seconds(synt.stats.starttime, (index - 1) as f64 * delta),
                );
                window.max_cc_value = Some(cc);
                window.cc_shift = Some(0.0);
                window.dlna = Some(energy_ratio(&observed[first..index], &synt.data[first..index]));
                windows.push(window);
            }
            _ => {}
        }
    }
    windows
}

/// Moving average of the absolute amplitude over `width` samples.
fn smoothed_envelope(data: &[f64], width: usize) -> Vec<f64> {
    let half = width.max(1) / 2;
    (0..data.len())
        .map(|index| {
            let lo = index.saturating_sub(half);
            let hi = (index + half + 1).min(data.len());
            data[lo..hi].iter().map(|v| v.abs()).sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

/// `0.5 * ln(E_obsd / E_synt)`, zero when either side carries no energy.
fn energy_ratio(observed: &[f64], synthetic: &[f64]) -> f64 {
    let obsd: f64 = observed.iter().map(|v| v * v).sum();
    let synt: f64 = synthetic.iter().map(|v| v * v).sum();
    if obsd <= 0.0 || synt <= 0.0 {
        0.0
    } else {
        0.5 * (obsd / synt).ln()
    }
}
