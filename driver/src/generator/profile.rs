use crate::archive::{ArchiveDocument, JsonArchive};
use adjcore::model::{
    ChannelMetadata, Event, Origin, StationMetadata, StationRecord, Stream, Trace, TraceId,
};
use adjcore::time::Timestamp;
use anyhow::Context;
use chrono::{TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

pub const OBSD_TAG: &str = "raw_observed";
pub const SYNT_TAG: &str = "synthetic";
const EVENT_NAME: &str = "C201601010000A";

const PARAM_TEMPLATE: &str = "\
proc_obsd_param:
  filter_flag: true
  pre_filt: [0.0125, 0.0167, 0.0370, 0.0500]
  relative_starttime: 0
  relative_endtime: 1700
  taper_percentage: 0.05
proc_synt_param:
  filter_flag: true
  pre_filt: [0.0125, 0.0167, 0.0370, 0.0500]
  relative_starttime: 0
  relative_endtime: 1700
  taper_percentage: 0.05
window_param:
  Z: {min_period: 27.0, max_period: 60.0}
  R: {min_period: 27.0, max_period: 60.0}
  T: {min_period: 27.0, max_period: 60.0}
adjsrc_param:
  adj_src_type: waveform_misfit
  min_period: 27.0
  max_period: 60.0
  taper_percentage: 0.3
";

/// Shape of the demo dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub stations: usize,
    pub npts: usize,
    pub delta: f64,
    /// Dominant period of the wavelets, in seconds.
    pub period: f64,
    /// Delay of the observed arrivals relative to the synthetic ones.
    pub time_shift: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            stations: 4,
            npts: 1800,
            delta: 1.0,
            period: 40.0,
            time_shift: 2.0,
            noise: 0.02,
            seed: 0,
        }
    }
}

/// Files written by [`generate_dataset`].
#[derive(Debug, Clone)]
pub struct DemoFiles {
    pub param_file: PathBuf,
    pub path_file: PathBuf,
    pub observed: PathBuf,
    pub synthetic: PathBuf,
    pub output: PathBuf,
}

fn origin_time() -> Timestamp {
    Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn demo_event() -> Event {
    Event::new(
        format!("smi:local/{}", EVENT_NAME),
        vec![Origin {
            time: origin_time(),
            latitude: -12.5,
            longitude: 166.3,
            depth_km: Some(33.0),
        }],
    )
}

fn station_metadata(index: usize, delta: f64) -> StationMetadata {
    let channels = ["MXZ", "MXR", "MXT"]
        .iter()
        .map(|code| ChannelMetadata {
            location: String::new(),
            code: code.to_string(),
            azimuth: 0.0,
            dip: if code.ends_with('Z') { -90.0 } else { 0.0 },
            sample_rate: Some(1.0 / delta),
        })
        .collect();
    StationMetadata {
        network: "XX".to_string(),
        station: format!("S{index:02}"),
        latitude: 10.0 + 6.0 * index as f64,
        longitude: 150.0 - 9.0 * index as f64,
        elevation_m: 100.0 * index as f64,
        local_depth_m: 0.0,
        channels,
    }
}

/// Great-circle distance in degrees.
fn distance_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    (2.0 * a.sqrt().min(1.0).asin()).to_degrees()
}

/// Gaussian-windowed sine centred on `arrival` seconds.
fn wavelet(time: f64, arrival: f64, period: f64) -> f64 {
    let t = time - arrival;
    (-(t / period).powi(2)).exp() * (2.0 * PI * t / period).sin()
}

/// (P amplitude, S amplitude) per component.
fn amplitudes(component: char) -> (f64, f64) {
    match component {
        'Z' => (0.6, 1.0),
        'R' => (0.4, 0.8),
        _ => (0.0, 1.0),
    }
}

fn build_stream(
    metadata: &StationMetadata,
    config: &DemoConfig,
    arrivals: (f64, f64),
    shift: f64,
    scale: f64,
    rng: Option<&mut StdRng>,
) -> Stream {
    let mut rng = rng;
    let traces = metadata
        .channels
        .iter()
        .map(|channel| {
            let component = channel.code.chars().last().unwrap_or('Z');
            let (p_amp, s_amp) = amplitudes(component);
            let data = (0..config.npts)
                .map(|index| {
                    let time = index as f64 * config.delta;
                    let clean = p_amp * wavelet(time, arrivals.0 + shift, config.period)
                        + s_amp * wavelet(time, arrivals.1 + shift, config.period);
                    let jitter = match rng.as_deref_mut() {
                        Some(rng) if config.noise > 0.0 => rng.gen_range(-config.noise..config.noise),
                        _ => 0.0,
                    };
                    scale * clean + jitter
                })
                .collect();
            Trace::new(
                TraceId::new(&metadata.network, &metadata.station, "", &channel.code),
                origin_time(),
                config.delta,
                data,
            )
        })
        .collect();
    Stream::new(traces)
}

/// Observed and synthetic archives for one event, seeded for reproducibility.
pub fn build_archives(config: &DemoConfig) -> (ArchiveDocument, ArchiveDocument) {
    let event = demo_event();
    let origin = &event.origins[0];
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut observed = Vec::with_capacity(config.stations);
    let mut synthetic = Vec::with_capacity(config.stations);

    for index in 0..config.stations {
        let metadata = station_metadata(index, config.delta);
        let distance = distance_deg(origin.latitude, origin.longitude, metadata.latitude, metadata.longitude);
        let arrivals = (100.0 + 8.0 * distance, 150.0 + 14.0 * distance);
        let name = metadata.station_id();

        let obsd = build_stream(&metadata, config, arrivals, config.time_shift, 1.05, Some(&mut rng));
        let synt = build_stream(&metadata, config, arrivals, 0.0, 1.0, None);
        observed.push(
            StationRecord::new(name.clone())
                .with_metadata(metadata.clone())
                .with_stream(OBSD_TAG, obsd),
        );
        synthetic.push(
            StationRecord::new(name)
                .with_metadata(metadata)
                .with_stream(SYNT_TAG, synt),
        );
    }

    (
        ArchiveDocument {
            events: vec![event.clone()],
            stations: observed,
        },
        ArchiveDocument {
            events: vec![event],
            stations: synthetic,
        },
    )
}

/// Writes both archives plus matching param and path descriptors into `dir`.
pub fn generate_dataset(dir: &Path, config: &DemoConfig) -> anyhow::Result<DemoFiles> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let (observed, synthetic) = build_archives(config);

    let observed_name = format!("{}.observed.json", EVENT_NAME);
    let synthetic_name = format!("{}.synthetic.json", EVENT_NAME);
    let output_name = format!("output/{}.adjoint.json", EVENT_NAME);
    let files = DemoFiles {
        param_file: dir.join("param.yml"),
        path_file: dir.join("path.json"),
        observed: dir.join(&observed_name),
        synthetic: dir.join(&synthetic_name),
        output: dir.join(&output_name),
    };

    JsonArchive::save(&files.observed, &observed)?;
    JsonArchive::save(&files.synthetic, &synthetic)?;
    fs::write(&files.param_file, PARAM_TEMPLATE)
        .with_context(|| format!("writing {}", files.param_file.display()))?;

    // paths are relative so the dataset can be moved around
    let path_descriptor = json!({
        "obsd_asdf": observed_name,
        "obsd_tag": OBSD_TAG,
        "synt_asdf": synthetic_name,
        "synt_tag": SYNT_TAG,
        "output_asdf": output_name,
        "figure_mode": false,
        "figure_dir": "figures",
    });
    let body = serde_json::to_string_pretty(&path_descriptor).context("serializing path descriptor")?;
    fs::write(&files.path_file, body)
        .with_context(|| format!("writing {}", files.path_file.display()))?;

    Ok(files)
}
