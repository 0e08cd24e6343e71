//! Core of the adjoint-source preparation pipeline.
//!
//! A run reads an observed and a synthetic waveform archive for one event,
//! refines the processing parameters with the event origin, and pushes every
//! matched station pair through signal processing, window selection, adjoint
//! computation and postprocessing. The heavy lifting is done by pluggable
//! capabilities (see [`prelude`]); this crate owns the orchestration, the
//! configuration model and the numerical postprocessing.

pub mod config;
pub mod error;
pub mod math;
pub mod model;
pub mod orchestrator;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod time;

#[cfg(test)]
mod testing;

pub use config::{Descriptor, ParameterBundle, PathDescriptor};
pub use error::{ArchiveError, CollaboratorError, ConfigError, PipelineError, PipelineResult};
pub use orchestrator::{AdjointPreparer, FailurePolicy, MatchedPairDispatcher};
pub use prelude::Toolkit;
