//! Shared fixtures and recording collaborators for unit tests.

use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{AdjointConfig, Descriptor, ParameterBundle, ProcessParams, WindowConfigs};
use crate::model::{
    AdjSrcType, AdjointSource, Event, Origin, StationAdjoint, StationMetadata, StationRecord, Stream, Trace,
    TraceId, Window, WindowSet,
};
use crate::prelude::{
    AdjointCalculator, AdjointPostprocessor, CollaboratorResult, FigureOptions,
    PostprocessRequest, SignalProcessor, Toolkit, WindowContext, WindowSelector,
};
use crate::processing::StandardPostprocessor;
use crate::time::{add_seconds, Timestamp};

pub const PARAM_YAML: &str = "\
proc_obsd_param:
  remove_response_flag: true
  filter_flag: true
  pre_filt: [0.0125, 0.0167, 0.0370, 0.0500]
  relative_starttime: -100
  relative_endtime: 300
proc_synt_param:
  filter_flag: true
  pre_filt: [0.0125, 0.0167, 0.0370, 0.0500]
  relative_starttime: -100
  relative_endtime: 300
window_param:
  Z: {min_period: 27.0, max_period: 60.0}
  R: {min_period: 27.0, max_period: 60.0}
  T: {min_period: 27.0, max_period: 60.0, cc_acceptance_level: 0.8}
adjsrc_param:
  adj_src_type: waveform_misfit
  min_period: 27.0
  max_period: 60.0
";

pub const OBSD_TAG: &str = "proc_obsd_27_60";
pub const SYNT_TAG: &str = "proc_synt_27_60";

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()
}

pub fn components() -> Vec<String> {
    vec!["Z".to_string(), "R".to_string(), "T".to_string()]
}

pub fn bundle() -> ParameterBundle {
    let descriptor = Descriptor::parse(PARAM_YAML).unwrap();
    ParameterBundle::from_descriptor(&descriptor, &components()).unwrap()
}

pub fn event_at(time: Timestamp, latitude: f64, longitude: f64) -> Event {
    Event::new(
        "smi:local/C201601010000A",
        vec![Origin {
            time,
            latitude,
            longitude,
            depth_km: Some(10.0),
        }],
    )
}

pub fn station_metadata() -> StationMetadata {
    station_metadata_named("ANMO")
}

pub fn station_metadata_named(station: &str) -> StationMetadata {
    StationMetadata {
        network: "IU".to_string(),
        station: station.to_string(),
        latitude: 34.95,
        longitude: -106.46,
        elevation_m: 1850.0,
        local_depth_m: 100.0,
        channels: Vec::new(),
    }
}

fn three_component_stream(station: &str, start: Timestamp, delta: f64, npts: usize, scale: f64) -> Stream {
    let traces = ["MXZ", "MXR", "MXT"]
        .iter()
        .map(|channel| {
            let data = (0..npts)
                .map(|i| scale * (i as f64 * 0.2).sin())
                .collect();
            Trace::new(TraceId::new("IU", station, "", channel), start, delta, data)
        })
        .collect();
    Stream::new(traces)
}

/// Observed/synthetic station groups; the synthetic starts at `synt_start`.
pub fn station_pair(station: &str, synt_start: Timestamp) -> (StationRecord, StationRecord) {
    let name = format!("IU.{station}");
    let observed = StationRecord::new(name.clone())
        .with_metadata(station_metadata_named(station))
        .with_stream(OBSD_TAG, three_component_stream(station, synt_start, 0.5, 400, 1.0));
    let synthetic = StationRecord::new(name)
        .with_metadata(station_metadata_named(station))
        .with_stream(SYNT_TAG, three_component_stream(station, synt_start, 0.5, 400, 0.8));
    (observed, synthetic)
}

/// Decimates by two, so processed traces differ in delta and npts from raw ones.
#[derive(Default)]
pub struct DecimatingProcessor {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<ProcessParams>>,
}

impl SignalProcessor for DecimatingProcessor {
    fn process(
        &self,
        stream: &Stream,
        _inventory: &StationMetadata,
        params: &ProcessParams,
    ) -> CollaboratorResult<Stream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());
        let traces = stream
            .iter()
            .map(|trace| {
                let data = trace.data.iter().step_by(2).copied().collect();
                Trace::new(
                    trace.id.clone(),
                    add_seconds(trace.stats.starttime, 1.0),
                    trace.stats.delta * 2.0,
                    data,
                )
            })
            .collect();
        Ok(Stream::new(traces))
    }
}

/// Picks one window per synthetic trace, or nothing when `empty` is set.
#[derive(Default)]
pub struct FixedSelector {
    pub empty: bool,
    pub calls: AtomicUsize,
}

impl WindowSelector for FixedSelector {
    fn select(
        &self,
        _observed: &Stream,
        synthetic: &Stream,
        _configs: &WindowConfigs,
        _context: WindowContext<'_>,
    ) -> CollaboratorResult<WindowSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut windows = WindowSet::new();
        for trace in synthetic.iter() {
            if self.empty {
                windows.channels.insert(trace.id.to_string(), Vec::new());
            } else {
                windows.insert(
                    trace.id.to_string(),
                    Window::new(
                        add_seconds(trace.stats.starttime, 10.0),
                        add_seconds(trace.stats.starttime, 60.0),
                    ),
                );
            }
        }
        Ok(windows)
    }
}

/// Synthetic minus observed over the processed traces.
#[derive(Default)]
pub struct DifferenceCalculator {
    pub calls: AtomicUsize,
}

impl AdjointCalculator for DifferenceCalculator {
    fn calculate(
        &self,
        observed: &Stream,
        synthetic: &Stream,
        windows: &WindowSet,
        config: &AdjointConfig,
        adj_src_type: AdjSrcType,
        _figure: &FigureOptions,
    ) -> CollaboratorResult<Vec<AdjointSource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let sources = synthetic
            .iter()
            .filter(|synt| windows.get(&synt.id.to_string()).is_some())
            .zip(observed.iter())
            .map(|(synt, obsd)| AdjointSource {
                id: synt.id.clone(),
                adj_src_type,
                misfit: 1.0,
                starttime: synt.stats.starttime,
                dt: synt.stats.delta,
                min_period: config.min_period,
                max_period: config.max_period,
                data: synt.data.iter().zip(&obsd.data).map(|(s, o)| s - o).collect(),
            })
            .collect();
        Ok(sources)
    }
}

#[derive(Default)]
pub struct CountingPostprocessor {
    pub calls: AtomicUsize,
}

impl AdjointPostprocessor for CountingPostprocessor {
    fn postprocess(
        &self,
        adjoint_sources: Vec<AdjointSource>,
        request: &PostprocessRequest<'_>,
    ) -> CollaboratorResult<Vec<AdjointSource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StandardPostprocessor.postprocess(adjoint_sources, request)
    }
}

pub struct Recorders {
    pub processor: Arc<DecimatingProcessor>,
    pub selector: Arc<FixedSelector>,
    pub calculator: Arc<DifferenceCalculator>,
    pub postprocessor: Arc<CountingPostprocessor>,
}

impl Recorders {
    pub fn new(empty_windows: bool) -> Self {
        Self {
            processor: Arc::new(DecimatingProcessor::default()),
            selector: Arc::new(FixedSelector {
                empty: empty_windows,
                calls: AtomicUsize::new(0),
            }),
            calculator: Arc::new(DifferenceCalculator::default()),
            postprocessor: Arc::new(CountingPostprocessor::default()),
        }
    }

    pub fn toolkit(&self) -> Toolkit {
        Toolkit::new(
            self.processor.clone(),
            self.selector.clone(),
            self.calculator.clone(),
        )
        .with_postprocessor(self.postprocessor.clone())
    }
}

/// Archive held in memory, addressed by a fake path.
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    path: std::path::PathBuf,
    events: Vec<Event>,
    stations: Vec<StationRecord>,
}

impl MemoryArchive {
    pub fn new(
        path: impl Into<std::path::PathBuf>,
        events: Vec<Event>,
        stations: Vec<StationRecord>,
    ) -> Self {
        Self {
            path: path.into(),
            events,
            stations,
        }
    }
}

impl crate::orchestrator::Archive for MemoryArchive {
    fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn station_names(&self) -> Vec<String> {
        self.stations.iter().map(|s| s.name.clone()).collect()
    }

    fn station(&self, name: &str) -> Option<&dyn crate::model::StationGroup> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .map(|s| s as &dyn crate::model::StationGroup)
    }
}

/// Hands out clones of registered in-memory archives by path.
#[derive(Default)]
pub struct MemoryReader {
    pub archives: std::collections::BTreeMap<std::path::PathBuf, MemoryArchive>,
}

impl crate::orchestrator::ArchiveReader for MemoryReader {
    fn open(
        &self,
        path: &std::path::Path,
    ) -> Result<Box<dyn crate::orchestrator::Archive>, crate::error::ArchiveError> {
        self.archives
            .get(path)
            .cloned()
            .map(|archive| Box::new(archive) as Box<dyn crate::orchestrator::Archive>)
            .ok_or_else(|| crate::error::ArchiveError::MissingInput(path.to_path_buf()))
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<StationAdjoint>>,
    calls: AtomicUsize,
}

impl RecordingWriter {
    pub fn written(&self) -> Vec<StationAdjoint> {
        self.written.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl crate::orchestrator::OutputWriter for RecordingWriter {
    fn write(
        &self,
        _output: &std::path::Path,
        _event: &Event,
        results: &[StationAdjoint],
    ) -> Result<(), crate::error::ArchiveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.written.lock().unwrap().extend_from_slice(results);
        Ok(())
    }
}
