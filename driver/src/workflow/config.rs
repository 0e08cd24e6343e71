use adjcore::config::Descriptor;
use adjcore::orchestrator::{FailurePolicy, DEFAULT_COMPONENTS};
use anyhow::Context;
use std::path::PathBuf;

/// Everything one preparation run needs from the command line.
#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    pub param_file: PathBuf,
    pub path_file: PathBuf,
    pub components: Vec<String>,
    pub policy: FailurePolicy,
    pub parallel: bool,
    pub verbose: bool,
}

impl WorkflowConfig {
    pub fn new(param_file: PathBuf, path_file: PathBuf) -> Self {
        Self {
            param_file,
            path_file,
            components: DEFAULT_COMPONENTS.iter().map(|c| c.to_string()).collect(),
            policy: FailurePolicy::default(),
            parallel: true,
            verbose: false,
        }
    }

    /// Reads the path (JSON) and param (YAML) descriptors.
    pub fn load_descriptors(&self) -> anyhow::Result<(Descriptor, Descriptor)> {
        let path = Descriptor::from_file(&self.path_file)
            .with_context(|| format!("loading path descriptor {}", self.path_file.display()))?;
        let param = Descriptor::from_file(&self.param_file)
            .with_context(|| format!("loading param descriptor {}", self.param_file.display()))?;
        Ok((path, param))
    }
}
