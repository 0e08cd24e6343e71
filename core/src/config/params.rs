use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::descriptor::resolve_section;
use crate::error::ConfigError;
use crate::model::AdjSrcType;
use crate::time::Timestamp;

/// Signal-processing options for one side (observed or synthetic).
///
/// `starttime`, `endtime` and the event coordinates are filled in by the
/// orchestrator once the event is known; descriptors only carry the relative
/// offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessParams {
    #[serde(default)]
    pub remove_response_flag: bool,
    #[serde(default)]
    pub water_level: Option<f64>,
    #[serde(default)]
    pub filter_flag: bool,
    /// Four corner frequencies (Hz) of the cosine pre-filter taper.
    #[serde(default)]
    pub pre_filt: Option<[f64; 4]>,
    pub relative_starttime: f64,
    pub relative_endtime: f64,
    #[serde(default)]
    pub resample_flag: bool,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(default = "default_taper_type")]
    pub taper_type: String,
    #[serde(default = "default_process_taper_percentage")]
    pub taper_percentage: f64,
    #[serde(default)]
    pub rotate_flag: bool,
    #[serde(default)]
    pub sanity_check: bool,
    #[serde(default)]
    pub starttime: Option<Timestamp>,
    #[serde(default)]
    pub endtime: Option<Timestamp>,
    #[serde(default)]
    pub event_latitude: Option<f64>,
    #[serde(default)]
    pub event_longitude: Option<f64>,
}

fn default_sampling_rate() -> f64 {
    1.0
}

fn default_taper_type() -> String {
    "hann".to_string()
}

fn default_process_taper_percentage() -> f64 {
    0.05
}

/// Window-selection options for one spatial component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    pub min_period: f64,
    pub max_period: f64,
    #[serde(default = "default_stalta_waterlevel")]
    pub stalta_waterlevel: f64,
    #[serde(default = "default_tshift_acceptance_level")]
    pub tshift_acceptance_level: f64,
    #[serde(default)]
    pub tshift_reference: f64,
    #[serde(default = "default_dlna_acceptance_level")]
    pub dlna_acceptance_level: f64,
    #[serde(default)]
    pub dlna_reference: f64,
    #[serde(default = "default_cc_acceptance_level")]
    pub cc_acceptance_level: f64,
    #[serde(default = "default_s2n_limit")]
    pub s2n_limit: f64,
    #[serde(default = "default_earth_model")]
    pub earth_model: String,
    #[serde(default = "default_min_surface_wave_velocity")]
    pub min_surface_wave_velocity: f64,
    #[serde(default = "default_max_time_before_first_arrival")]
    pub max_time_before_first_arrival: f64,
    #[serde(default = "default_c_0")]
    pub c_0: f64,
    #[serde(default = "default_c_1")]
    pub c_1: f64,
    #[serde(default)]
    pub c_2: f64,
    #[serde(default = "default_c_3a")]
    pub c_3a: f64,
    #[serde(default = "default_c_3b")]
    pub c_3b: f64,
    #[serde(default = "default_c_4a")]
    pub c_4a: f64,
    #[serde(default = "default_c_4b")]
    pub c_4b: f64,
    #[serde(default)]
    pub check_global_data_quality: bool,
    #[serde(default = "default_snr_integrate_base")]
    pub snr_integrate_base: f64,
    #[serde(default = "default_snr_max_base")]
    pub snr_max_base: f64,
    #[serde(default)]
    pub noise_start_index: usize,
    #[serde(default)]
    pub noise_end_index: Option<usize>,
    #[serde(default)]
    pub signal_start_index: Option<usize>,
    #[serde(default = "default_signal_end_index")]
    pub signal_end_index: i64,
    #[serde(default = "default_window_signal_to_noise_type")]
    pub window_signal_to_noise_type: String,
    #[serde(default)]
    pub selection_mode: Option<String>,
    #[serde(default = "default_resolution_strategy")]
    pub resolution_strategy: String,
}

fn default_stalta_waterlevel() -> f64 {
    0.07
}
fn default_tshift_acceptance_level() -> f64 {
    10.0
}
fn default_dlna_acceptance_level() -> f64 {
    1.3
}
fn default_cc_acceptance_level() -> f64 {
    0.7
}
fn default_s2n_limit() -> f64 {
    1.5
}
fn default_earth_model() -> String {
    "ak135".to_string()
}
fn default_min_surface_wave_velocity() -> f64 {
    3.0
}
fn default_max_time_before_first_arrival() -> f64 {
    50.0
}
fn default_c_0() -> f64 {
    1.0
}
fn default_c_1() -> f64 {
    1.5
}
fn default_c_3a() -> f64 {
    4.0
}
fn default_c_3b() -> f64 {
    2.5
}
fn default_c_4a() -> f64 {
    2.0
}
fn default_c_4b() -> f64 {
    6.0
}
fn default_snr_integrate_base() -> f64 {
    3.5
}
fn default_snr_max_base() -> f64 {
    3.0
}
fn default_signal_end_index() -> i64 {
    -1
}
fn default_window_signal_to_noise_type() -> String {
    "amplitude".to_string()
}
fn default_resolution_strategy() -> String {
    "interval_scheduling".to_string()
}

/// Adjoint-source measurement options (without the type tag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjointConfig {
    pub min_period: f64,
    pub max_period: f64,
    #[serde(default = "default_lnpt")]
    pub lnpt: u32,
    #[serde(default = "default_transfunc_waterlevel")]
    pub transfunc_waterlevel: f64,
    #[serde(default = "default_water_threshold")]
    pub water_threshold: f64,
    #[serde(default = "default_ipower_costaper")]
    pub ipower_costaper: u32,
    #[serde(default = "default_min_cycle_in_window")]
    pub min_cycle_in_window: f64,
    #[serde(default = "default_taper_type")]
    pub taper_type: String,
    #[serde(default = "default_adjoint_taper_percentage")]
    pub taper_percentage: f64,
    #[serde(default = "default_mt_nw")]
    pub mt_nw: f64,
    #[serde(default = "default_num_taper")]
    pub num_taper: u32,
    #[serde(default = "default_dt_fac")]
    pub dt_fac: f64,
    #[serde(default = "default_phase_step")]
    pub phase_step: f64,
    #[serde(default = "default_err_fac")]
    pub err_fac: f64,
    #[serde(default = "default_dt_max_scale")]
    pub dt_max_scale: f64,
    #[serde(default = "default_measure_type")]
    pub measure_type: String,
    #[serde(default = "default_dt_sigma_min")]
    pub dt_sigma_min: f64,
    #[serde(default = "default_dlna_sigma_min")]
    pub dlna_sigma_min: f64,
    #[serde(default = "default_true")]
    pub use_cc_error: bool,
    #[serde(default)]
    pub use_mt_error: bool,
}

fn default_lnpt() -> u32 {
    15
}
fn default_transfunc_waterlevel() -> f64 {
    1e-10
}
fn default_water_threshold() -> f64 {
    0.02
}
fn default_ipower_costaper() -> u32 {
    10
}
fn default_min_cycle_in_window() -> f64 {
    0.5
}
fn default_adjoint_taper_percentage() -> f64 {
    0.3
}
fn default_mt_nw() -> f64 {
    4.0
}
fn default_num_taper() -> u32 {
    5
}
fn default_dt_fac() -> f64 {
    2.0
}
fn default_phase_step() -> f64 {
    1.5
}
fn default_err_fac() -> f64 {
    2.5
}
fn default_dt_max_scale() -> f64 {
    3.5
}
fn default_measure_type() -> String {
    "dt".to_string()
}
fn default_dt_sigma_min() -> f64 {
    1.0
}
fn default_dlna_sigma_min() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}

/// Window configuration per spatial component name.
pub type WindowConfigs = BTreeMap<String, WindowConfig>;

/// Fully typed parameter set driving one preparation run.
///
/// Each station pipeline receives its own clone, so per-station changes stay local.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBundle {
    pub proc_obsd: ProcessParams,
    pub proc_synt: ProcessParams,
    pub window: WindowConfigs,
    pub adjoint: AdjointConfig,
    pub adj_src_type: AdjSrcType,
}

fn deserialize_section<T: serde::de::DeserializeOwned>(
    section: &str,
    mapping: Mapping,
) -> Result<T, ConfigError> {
    serde_yaml::from_value(Value::Mapping(mapping)).map_err(|source| {
        ConfigError::InvalidSection {
            section: section.to_string(),
            source,
        }
    })
}

pub fn load_process_config(section: &str, mapping: &Mapping) -> Result<ProcessParams, ConfigError> {
    deserialize_section(section, mapping.clone())
}

/// Builds one window configuration per component key. A component value is
/// either an inline mapping or a path to a YAML file, resolved against `base_dir`.
pub fn load_window_config(
    mapping: &Mapping,
    base_dir: Option<&Path>,
) -> Result<WindowConfigs, ConfigError> {
    let mut configs = BTreeMap::new();
    for (key, value) in mapping {
        let component = match key {
            Value::String(name) => name.clone(),
            _ => {
                return Err(ConfigError::NotAMapping {
                    section: "window_param".to_string(),
                })
            }
        };
        let section = format!("window_param.{component}");
        let value = resolve_section(&section, value, base_dir)?;
        let config = deserialize_section(&section, value)?;
        configs.insert(component, config);
    }
    Ok(configs)
}

/// Splits `adj_src_type` off the adjoint options. The caller's mapping is left untouched.
pub fn load_adjoint_config(mapping: &Mapping) -> Result<(AdjointConfig, AdjSrcType), ConfigError> {
    let section = "adjsrc_param";
    let type_value = mapping
        .get("adj_src_type")
        .cloned()
        .ok_or_else(|| ConfigError::MissingAdjointType {
            section: section.to_string(),
        })?;
    let adj_src_type: AdjSrcType = serde_yaml::from_value(type_value).map_err(|source| {
        ConfigError::InvalidSection {
            section: format!("{section}.adj_src_type"),
            source,
        }
    })?;

    let remainder: Mapping = mapping
        .iter()
        .filter(|(key, _)| key.as_str() != Some("adj_src_type"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let config = deserialize_section(section, remainder)?;
    Ok((config, adj_src_type))
}
