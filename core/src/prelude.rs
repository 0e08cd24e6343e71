use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AdjointConfig, ProcessParams, WindowConfigs};
use crate::error::CollaboratorError;
use crate::model::{
    AdjSrcType, AdjointSource, ChannelWeights, Event, StationMetadata, Stream, TraceStats,
    WindowSet,
};

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Diagnostic figure switches forwarded to windowing and adjoint capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigureOptions {
    pub enabled: bool,
    pub dir: Option<PathBuf>,
}

impl FigureOptions {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Per-station figure file, named so concurrent stations never collide.
    pub fn figure_path(&self, station_id: &str, kind: &str, extension: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{station_id}.{kind}.{extension}")))
    }
}

/// Context shared by the window selector for one station.
#[derive(Debug, Clone, Copy)]
pub struct WindowContext<'a> {
    pub station: &'a StationMetadata,
    pub event: &'a Event,
    pub figure: &'a FigureOptions,
    pub verbose: bool,
}

/// Instrument correction, filtering, cutting and resampling of one stream.
pub trait SignalProcessor: Send + Sync {
    fn process(
        &self,
        stream: &Stream,
        inventory: &StationMetadata,
        params: &ProcessParams,
    ) -> CollaboratorResult<Stream>;
}

/// Picks measurement windows on a processed observed/synthetic pair.
pub trait WindowSelector: Send + Sync {
    fn select(
        &self,
        observed: &Stream,
        synthetic: &Stream,
        configs: &WindowConfigs,
        context: WindowContext<'_>,
    ) -> CollaboratorResult<WindowSet>;
}

/// Normalizes selector output before adjoint computation.
pub trait WindowTransform: Send + Sync {
    fn transform(&self, windows: WindowSet) -> WindowSet;
}

/// Computes one adjoint source per windowed channel.
pub trait AdjointCalculator: Send + Sync {
    fn calculate(
        &self,
        observed: &Stream,
        synthetic: &Stream,
        windows: &WindowSet,
        config: &AdjointConfig,
        adj_src_type: AdjSrcType,
        figure: &FigureOptions,
    ) -> CollaboratorResult<Vec<AdjointSource>>;
}

/// Everything the postprocessing step needs besides the adjoint sources.
#[derive(Debug, Clone, Copy)]
pub struct PostprocessRequest<'a> {
    /// Timing of the raw synthetic trace the output must line up with.
    pub timing: TraceStats,
    /// Band and instrument code used to name summed channels.
    pub channel_prefix: &'a str,
    pub inventory: &'a StationMetadata,
    pub event: &'a Event,
    pub weights: &'a ChannelWeights,
    pub pre_filt: Option<[f64; 4]>,
}

/// Interpolation, component summation, weighting, rotation and filtering.
pub trait AdjointPostprocessor: Send + Sync {
    fn postprocess(
        &self,
        adjoint_sources: Vec<AdjointSource>,
        request: &PostprocessRequest<'_>,
    ) -> CollaboratorResult<Vec<AdjointSource>>;
}

/// The set of capabilities a station pipeline runs with.
#[derive(Clone)]
pub struct Toolkit {
    pub processor: Arc<dyn SignalProcessor>,
    pub selector: Arc<dyn WindowSelector>,
    pub transform: Arc<dyn WindowTransform>,
    pub calculator: Arc<dyn AdjointCalculator>,
    pub postprocessor: Arc<dyn AdjointPostprocessor>,
}

impl Toolkit {
    /// Uses the built-in window transform and postprocessor.
    pub fn new(
        processor: Arc<dyn SignalProcessor>,
        selector: Arc<dyn WindowSelector>,
        calculator: Arc<dyn AdjointCalculator>,
    ) -> Self {
        Self {
            processor,
            selector,
            transform: Arc::new(crate::processing::SmartWindowTransform),
            calculator,
            postprocessor: Arc::new(crate::processing::StandardPostprocessor),
        }
    }

    pub fn with_postprocessor(mut self, postprocessor: Arc<dyn AdjointPostprocessor>) -> Self {
        self.postprocessor = postprocessor;
        self
    }
}
