use crate::archive::{JsonArchiveReader, JsonArchiveWriter};
use crate::reference::reference_toolkit;
use crate::workflow::config::WorkflowConfig;
use adjcore::orchestrator::{AdjointPreparer, DispatchSummary, MatchedPairDispatcher};
use adjcore::prelude::Toolkit;
use anyhow::Context;

pub struct Runner {
    config: WorkflowConfig,
    toolkit: Toolkit,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            toolkit: reference_toolkit(),
        }
    }

    /// Loads both descriptors and runs the preparer over the JSON archives.
    pub fn execute(&self) -> anyhow::Result<DispatchSummary> {
        let (path, param) = self.config.load_descriptors()?;

        let mut dispatcher = MatchedPairDispatcher::new(JsonArchiveWriter).with_policy(self.config.policy);
        if !self.config.parallel {
            dispatcher = dispatcher.sequential();
        }
        let mut preparer =
            AdjointPreparer::new(self.config.verbose).with_components(self.config.components.clone());

        preparer
            .run(&path, &param, &JsonArchiveReader, &dispatcher, &self.toolkit)
            .with_context(|| {
                format!(
                    "preparing adjoint sources from {}",
                    self.config.path_file.display()
                )
            })
    }
}
