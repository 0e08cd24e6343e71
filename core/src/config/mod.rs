pub mod descriptor;
pub mod params;
pub mod path;

use std::collections::BTreeSet;

pub use descriptor::{missing_keys, require_keys, Descriptor};
pub use params::{
    load_adjoint_config, load_process_config, load_window_config, AdjointConfig,
    ParameterBundle, ProcessParams, WindowConfig, WindowConfigs,
};
pub use path::{PathDescriptor, PATH_KEYS};

use crate::error::ConfigError;

pub const PARAM_KEYS: [&str; 4] = [
    "proc_obsd_param",
    "proc_synt_param",
    "adjsrc_param",
    "window_param",
];

impl ParameterBundle {
    /// Parses a parameter descriptor, requiring the window components to match
    /// `components` exactly.
    pub fn from_descriptor(
        descriptor: &Descriptor,
        components: &[String],
    ) -> Result<Self, ConfigError> {
        let mapping = descriptor.mapping("param")?;
        require_keys("param", &PARAM_KEYS, mapping)?;

        let proc_obsd = load_process_config(
            "proc_obsd_param",
            &descriptor.section("proc_obsd_param")?,
        )?;
        let proc_synt = load_process_config(
            "proc_synt_param",
            &descriptor.section("proc_synt_param")?,
        )?;

        let window_mapping = descriptor.section("window_param")?;
        check_components(&descriptor::mapping_keys(&window_mapping), components)?;
        let window = load_window_config(&window_mapping, descriptor.base_dir())?;

        let (adjoint, adj_src_type) = load_adjoint_config(&descriptor.section("adjsrc_param")?)?;

        Ok(Self {
            proc_obsd,
            proc_synt,
            window,
            adjoint,
            adj_src_type,
        })
    }
}

/// The window component set must equal the configured one: no subset, no superset.
pub fn check_components(found: &[String], expected: &[String]) -> Result<(), ConfigError> {
    let found_set: BTreeSet<&str> = found.iter().map(String::as_str).collect();
    let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    if found_set == expected_set {
        return Ok(());
    }
    Err(ConfigError::ComponentMismatch {
        found: found_set.into_iter().map(str::to_string).collect(),
        expected: expected_set.into_iter().map(str::to_string).collect(),
    })
}
