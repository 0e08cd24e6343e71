use log::{error, info, warn};
use serde::Serialize;
use std::fs;

use super::archive::{check_input_file, check_output_file, ArchiveReader};
use super::dispatch::{DispatchSummary, PairDispatcher};
use super::refine::{refine_param, select_event};
use crate::config::{require_keys, Descriptor, ParameterBundle, PathDescriptor, PARAM_KEYS};
use crate::error::{ArchiveError, ConfigError, PipelineResult};
use crate::model::StationGroup;
use crate::prelude::{FigureOptions, Toolkit};
use crate::processing::{process_station, StationContext};
use crate::telemetry::LogManager;

pub const DEFAULT_COMPONENTS: [&str; 3] = ["Z", "R", "T"];

/// Where a preparation run currently is. Any failure lands in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Init,
    ParseParam,
    Validate,
    LoadArchives,
    RefineParam,
    Dispatch,
    Done,
    Failed,
}

/// Prepares adjoint sources for every station pair of one event.
pub struct AdjointPreparer {
    components: Vec<String>,
    verbose: bool,
    state: RunState,
    logger: LogManager,
}

impl AdjointPreparer {
    pub fn new(verbose: bool) -> Self {
        Self {
            components: DEFAULT_COMPONENTS.iter().map(|c| c.to_string()).collect(),
            verbose,
            state: RunState::Init,
            logger: LogManager::new(),
        }
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = components;
        self
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn validate_param(&self, param: &Descriptor) -> Result<(), ConfigError> {
        require_keys("param", &PARAM_KEYS, param.mapping("param")?)
    }

    pub fn validate_path(&self, path: &Descriptor) -> Result<PathDescriptor, ConfigError> {
        PathDescriptor::from_descriptor(path)
    }

    /// Loads the processing, window and adjoint configs of the param descriptor.
    pub fn parse_param(&self, param: &Descriptor) -> Result<ParameterBundle, ConfigError> {
        self.validate_param(param)?;
        ParameterBundle::from_descriptor(param, &self.components)
    }

    /// Runs the whole preparation: configs, file checks, archives, event
    /// refinement, then per-station dispatch.
    pub fn run(
        &mut self,
        path: &Descriptor,
        param: &Descriptor,
        reader: &dyn ArchiveReader,
        dispatcher: &dyn PairDispatcher,
        toolkit: &Toolkit,
    ) -> PipelineResult<DispatchSummary> {
        match self.execute(path, param, reader, dispatcher, toolkit) {
            Ok(summary) => {
                self.state = RunState::Done;
                Ok(summary)
            }
            Err(err) => {
                error!("preparation failed during {:?}: {}", self.state, err);
                self.state = RunState::Failed;
                Err(err)
            }
        }
    }

    fn execute(
        &mut self,
        path: &Descriptor,
        param: &Descriptor,
        reader: &dyn ArchiveReader,
        dispatcher: &dyn PairDispatcher,
        toolkit: &Toolkit,
    ) -> PipelineResult<DispatchSummary> {
        self.state = RunState::ParseParam;
        self.logger.print_info("Param", param.value());
        let mut params = self.parse_param(param)?;

        self.state = RunState::Validate;
        self.logger.print_info("Path", path.value());
        let paths = self.validate_path(path)?;
        check_input_file(&paths.obsd_asdf)?;
        check_input_file(&paths.synt_asdf)?;
        check_output_file(&paths.output_asdf)?;
        let figure = figure_options(&paths)?;

        self.state = RunState::LoadArchives;
        let observed = reader.open(&paths.obsd_asdf)?;
        let synthetic = reader.open(&paths.synt_asdf)?;
        let event = select_event(observed.as_ref())?.clone();
        info!("event {} with {} origin(s)", event.resource_id, event.origins.len());

        self.state = RunState::RefineParam;
        refine_param(&mut params, &event)?;
        if self.verbose {
            self.logger.print_info("Refined param", &params);
        }

        self.state = RunState::Dispatch;
        let context = StationContext {
            obsd_tag: paths.obsd_tag.clone(),
            synt_tag: paths.synt_tag.clone(),
            event: event.clone(),
            figure,
            verbose: self.verbose,
        };
        let station_fn = |obsd: &dyn StationGroup, synt: &dyn StationGroup| {
            process_station(obsd, synt, &context, params.clone(), toolkit)
        };
        let summary = dispatcher.process_two_archives(
            observed.as_ref(),
            synthetic.as_ref(),
            &station_fn,
            &paths.output_asdf,
            &event,
        )?;
        self.logger.print_info("Summary", &summary);
        Ok(summary)
    }
}

fn figure_options(paths: &PathDescriptor) -> Result<FigureOptions, ArchiveError> {
    if !paths.figure_mode {
        return Ok(FigureOptions::disabled());
    }
    let Some(dir) = paths.figure_dir.clone() else {
        warn!("figure_mode is set without a figure_dir, figures disabled");
        return Ok(FigureOptions::disabled());
    };
    fs::create_dir_all(&dir).map_err(|source| ArchiveError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(FigureOptions {
        enabled: true,
        dir: Some(dir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::orchestrator::MatchedPairDispatcher;
    use crate::testing::{
        event_at, station_pair, t0, MemoryArchive, MemoryReader, Recorders, RecordingWriter,
        OBSD_TAG, PARAM_YAML, SYNT_TAG,
    };
    use crate::time::add_seconds;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        reader: MemoryReader,
    }

    impl Fixture {
        fn new(stations: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            let mut observed = Vec::new();
            let mut synthetic = Vec::new();
            for station in stations {
                let (obsd, synt) = station_pair(station, t0());
                observed.push(obsd);
                synthetic.push(synt);
            }
            let event = event_at(t0(), 10.0, 20.0);
            let mut reader = MemoryReader::default();
            for (name, records) in [("observed.json", observed), ("synthetic.json", synthetic)] {
                let file = dir.path().join(name);
                fs::write(&file, "{}").unwrap();
                reader
                    .archives
                    .insert(file.clone(), MemoryArchive::new(file, vec![event.clone()], records));
            }
            Self { dir, reader }
        }

        fn file(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn path_descriptor(&self, figure_mode: bool) -> Descriptor {
            let json = format!(
                r#"{{"obsd_asdf": "{}", "obsd_tag": "{}", "synt_asdf": "{}", "synt_tag": "{}",
                    "output_asdf": "{}", "figure_mode": {}, "figure_dir": "{}"}}"#,
                self.file("observed.json").display(),
                OBSD_TAG,
                self.file("synthetic.json").display(),
                SYNT_TAG,
                self.file("out/adjoint.json").display(),
                figure_mode,
                self.file("figures").display(),
            );
            Descriptor::parse(&json).unwrap()
        }
    }

    fn param() -> Descriptor {
        Descriptor::parse(PARAM_YAML).unwrap()
    }

    #[test]
    fn full_run_processes_every_matched_station() {
        let fixture = Fixture::new(&["ANMO", "COLA"]);
        let recorders = Recorders::new(false);
        let dispatcher = MatchedPairDispatcher::new(RecordingWriter::default());
        let mut preparer = AdjointPreparer::new(false);

        let summary = preparer
            .run(
                &fixture.path_descriptor(false),
                &param(),
                &fixture.reader,
                &dispatcher,
                &recorders.toolkit(),
            )
            .unwrap();

        assert_eq!(preparer.state(), RunState::Done);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.processed, 2);
        assert_eq!(dispatcher.writer().written().len(), 2);
        assert!(fixture.file("out").is_dir());
        assert!(!fixture.file("figures").exists());

        // every station saw the event-refined cut window
        let seen = recorders.processor.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen
            .iter()
            .all(|params| params.starttime == Some(add_seconds(t0(), -100.0))
                && params.event_latitude == Some(10.0)));
    }

    #[test]
    fn missing_param_keys_fail_before_loading() {
        let fixture = Fixture::new(&["ANMO"]);
        let recorders = Recorders::new(false);
        let dispatcher = MatchedPairDispatcher::new(RecordingWriter::default());
        let mut preparer = AdjointPreparer::new(false);
        let param = Descriptor::parse("proc_obsd_param: {}\nwindow_param: {}\n").unwrap();

        let err = preparer
            .run(&fixture.path_descriptor(false), &param, &fixture.reader, &dispatcher, &recorders.toolkit())
            .unwrap_err();
        match err {
            PipelineError::Config(ConfigError::MissingKeys { descriptor, keys }) => {
                assert_eq!(descriptor, "param");
                assert_eq!(keys, vec!["proc_synt_param", "adjsrc_param"]);
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(preparer.state(), RunState::Failed);
        assert_eq!(dispatcher.writer().write_calls(), 0);
    }

    #[test]
    fn component_mismatch_is_a_config_error() {
        let preparer = AdjointPreparer::new(false).with_components(vec!["Z".into(), "R".into()]);
        assert!(matches!(
            preparer.parse_param(&param()),
            Err(ConfigError::ComponentMismatch { .. })
        ));
    }

    #[test]
    fn missing_input_archive_is_reported() {
        let fixture = Fixture::new(&["ANMO"]);
        fs::remove_file(fixture.file("synthetic.json")).unwrap();
        let recorders = Recorders::new(false);
        let dispatcher = MatchedPairDispatcher::new(RecordingWriter::default());
        let mut preparer = AdjointPreparer::new(false);

        let err = preparer
            .run(&fixture.path_descriptor(false), &param(), &fixture.reader, &dispatcher, &recorders.toolkit())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Archive(ArchiveError::MissingInput(ref path)) if path == &fixture.file("synthetic.json")
        ));
        assert_eq!(preparer.state(), RunState::Failed);
    }

    #[test]
    fn figure_mode_creates_figure_dir() {
        let fixture = Fixture::new(&["ANMO"]);
        let recorders = Recorders::new(false);
        let dispatcher = MatchedPairDispatcher::new(RecordingWriter::default()).sequential();
        let mut preparer = AdjointPreparer::new(true);

        preparer
            .run(&fixture.path_descriptor(true), &param(), &fixture.reader, &dispatcher, &recorders.toolkit())
            .unwrap();
        assert!(Path::new(&fixture.file("figures")).is_dir());
    }
}
