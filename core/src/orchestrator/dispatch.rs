use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use super::archive::{Archive, OutputWriter};
use crate::error::PipelineResult;
use crate::model::{Event, StationAdjoint, StationGroup};
use crate::telemetry::{LogManager, MetricsRecorder};

/// Pipeline bound to one run's event, tags and parameters.
pub type StationFn<'a> = dyn Fn(&dyn StationGroup, &dyn StationGroup) -> PipelineResult<Option<StationAdjoint>>
    + Sync
    + 'a;

/// What happens to the run when one station fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and keep the other stations.
    #[default]
    Skip,
    /// Fail the whole run; nothing is written.
    Abort,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub matched: usize,
    pub processed: usize,
    pub empty: usize,
    pub failed: usize,
    /// `(station, error message)` for every skipped failure.
    pub failures: Vec<(String, String)>,
}

/// Drives the bound pipeline over the station pairs of two archives.
pub trait PairDispatcher {
    fn process_two_archives(
        &self,
        observed: &dyn Archive,
        synthetic: &dyn Archive,
        station_fn: &StationFn<'_>,
        output: &Path,
        event: &Event,
    ) -> PipelineResult<DispatchSummary>;
}

/// Matches stations by name, runs them sequentially or on the rayon pool,
/// and hands non-empty results to the writer.
pub struct MatchedPairDispatcher<W> {
    writer: W,
    policy: FailurePolicy,
    parallel: bool,
    logger: LogManager,
}

impl<W: OutputWriter> MatchedPairDispatcher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            policy: FailurePolicy::default(),
            parallel: true,
            logger: LogManager::new(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

type StationPair<'a> = (String, &'a dyn StationGroup, &'a dyn StationGroup);

fn matched_pairs<'a>(observed: &'a dyn Archive, synthetic: &'a dyn Archive) -> Vec<StationPair<'a>> {
    let synthetic_names: BTreeSet<String> = synthetic.station_names().into_iter().collect();
    let observed_names: BTreeSet<String> = observed.station_names().into_iter().collect();
    observed_names
        .into_iter()
        .filter(|name| synthetic_names.contains(name))
        .filter_map(|name| {
            let obsd = observed.station(&name)?;
            let synt = synthetic.station(&name)?;
            Some((name, obsd, synt))
        })
        .collect()
}

impl<W: OutputWriter> PairDispatcher for MatchedPairDispatcher<W> {
    fn process_two_archives(
        &self,
        observed: &dyn Archive,
        synthetic: &dyn Archive,
        station_fn: &StationFn<'_>,
        output: &Path,
        event: &Event,
    ) -> PipelineResult<DispatchSummary> {
        let pairs = matched_pairs(observed, synthetic);
        info!(
            "{} matched station pairs between {} and {}",
            pairs.len(),
            observed.path().display(),
            synthetic.path().display()
        );

        let metrics = MetricsRecorder::new();
        let run = |pair: &StationPair<'_>| {
            let (name, obsd, synt) = pair;
            let outcome = station_fn(*obsd, *synt);
            match &outcome {
                Ok(Some(result)) => {
                    metrics.record_processed();
                    self.logger.record_station(
                        name,
                        &format!("{} adjoint records", result.records.len()),
                    );
                }
                Ok(None) => {
                    metrics.record_empty();
                    self.logger.record_station(name, "no windows, skipped");
                }
                Err(err) => {
                    metrics.record_error();
                    error!("[{}] failed: {}", name, err);
                }
            }
            (name.clone(), outcome)
        };

        let outcomes: Vec<_> = if self.parallel {
            pairs.par_iter().map(run).collect()
        } else {
            pairs.iter().map(run).collect()
        };

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(err) if self.policy == FailurePolicy::Abort => return Err(err),
                Err(err) => failures.push((name, err.to_string())),
            }
        }

        self.writer.write(output, event, &results)?;
        let counts = metrics.snapshot();
        Ok(DispatchSummary {
            matched: pairs.len(),
            processed: counts.processed,
            empty: counts.empty,
            failed: counts.failed,
            failures,
        })
    }
}
