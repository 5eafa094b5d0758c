//! # Clinic configuration
//!
//! All model inputs travel in one immutable [`ClinicConfig`] value handed to the model at construction time.
//! Times are in hours.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [clinic]
//! hours_open = 20.0
//! n_pcp = 10
//! mean_arrival_time = 0.016666666666666666
//! mean_exam_duration = 0.16666666666666666
//! mean_mh_consult = 0.3333333333333333
//! prob_depression = 0.1
//!
//! [simulation]
//! sim_duration = 100000.0
//! trace_on = false
//! patient_summary = false
//! trace_decimals = 5
//! seed = 1
//! stop_when_drained = false
//! ```
//!
//! Every key is optional and falls back to the values above (no seed by default).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct: the clinic being modeled and the settings of the run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClinicConfig {
    #[serde(default)]
    pub clinic: ClinicParameters,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

/// The clinic itself.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClinicParameters {
    /// Hours the clinic admits new patients.
    #[serde(default = "default_hours_open")]
    pub hours_open: f64,
    /// Number of primary-care physicians.
    #[serde(default = "default_n_pcp")]
    pub n_pcp: usize,
    #[serde(default = "default_mean_arrival_time")]
    pub mean_arrival_time: f64,
    #[serde(default = "default_mean_exam_duration")]
    pub mean_exam_duration: f64,
    #[serde(default = "default_mean_mh_consult")]
    pub mean_mh_consult: f64,
    /// Probability that a patient is diagnosed with depression.
    #[serde(default = "default_prob_depression")]
    pub prob_depression: f64,
}

impl Default for ClinicParameters {
    fn default() -> Self {
        Self {
            hours_open: default_hours_open(),
            n_pcp: default_n_pcp(),
            mean_arrival_time: default_mean_arrival_time(),
            mean_exam_duration: default_mean_exam_duration(),
            mean_mh_consult: default_mean_mh_consult(),
            prob_depression: default_prob_depression(),
        }
    }
}

/// How a replication is run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// No event later than this is processed. Large enough that the clinic drains after closing.
    #[serde(default = "default_sim_duration")]
    pub sim_duration: f64,
    /// Keep the narrated trace of every event. Also keeps the per-patient report.
    #[serde(default = "default_trace_on")]
    pub trace_on: bool,
    /// Keep one report row per departed patient without tracing.
    #[serde(default)]
    pub patient_summary: bool,
    /// Decimals of the clock shown in trace lines.
    #[serde(default = "default_trace_decimals")]
    pub trace_decimals: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    /// End the run as soon as the clinic is closed and empty instead of letting turned-away arrivals run on until
    /// `sim_duration`.
    #[serde(default)]
    pub stop_when_drained: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            sim_duration: default_sim_duration(),
            trace_on: default_trace_on(),
            patient_summary: false,
            trace_decimals: default_trace_decimals(),
            seed: None,
            stop_when_drained: false,
        }
    }
}

fn default_hours_open() -> f64 {
    20.0
}
fn default_n_pcp() -> usize {
    10
}
fn default_mean_arrival_time() -> f64 {
    1.0 / 60.0
}
fn default_mean_exam_duration() -> f64 {
    10.0 / 60.0
}
fn default_mean_mh_consult() -> f64 {
    20.0 / 60.0
}
fn default_prob_depression() -> f64 {
    0.1
}
fn default_sim_duration() -> f64 {
    100_000.0
}
fn default_trace_on() -> bool {
    false
}
fn default_trace_decimals() -> usize {
    5
}

impl ClinicConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or on values rejected by [`validate()`](ClinicConfig::validate).
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Reports the first value that would make the model meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let clinic = &self.clinic;
        if clinic.n_pcp == 0 {
            return Err(ConfigError::Invalid("n_pcp must be at least 1".into()));
        }
        for (name, mean) in [
            ("mean_arrival_time", clinic.mean_arrival_time),
            ("mean_exam_duration", clinic.mean_exam_duration),
            ("mean_mh_consult", clinic.mean_mh_consult),
        ] {
            if !(mean.is_finite() && mean > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive and finite, got {mean}")));
            }
        }
        if !(0.0..=1.0).contains(&clinic.prob_depression) {
            return Err(ConfigError::Invalid(format!(
                "prob_depression must lie between 0 and 1, got {}",
                clinic.prob_depression
            )));
        }
        if !(clinic.hours_open.is_finite() && clinic.hours_open >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "hours_open must be non-negative and finite, got {}",
                clinic.hours_open
            )));
        }
        if !(self.simulation.sim_duration.is_finite() && self.simulation.sim_duration >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sim_duration must be non-negative and finite, got {}",
                self.simulation.sim_duration
            )));
        }
        Ok(())
    }
}

/// Read, parse and validate a configuration file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid TOML, or holds invalid values.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClinicConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = ClinicConfig::from_toml_str(&text)?;
    tracing::info!("Loaded configuration from TOML file: {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_reference_model() {
        let config = ClinicConfig::from_toml_str("").unwrap();
        assert_eq!(ClinicConfig::default(), config);
        assert_eq!(10, config.clinic.n_pcp);
        assert_eq!(20.0, config.clinic.hours_open);
        assert_eq!(None, config.simulation.seed);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ClinicConfig::from_toml_str(
            r#"
            [clinic]
            n_pcp = 2
            prob_depression = 0.5

            [simulation]
            seed = 17
            trace_on = true
            patient_summary = true
            stop_when_drained = true
            "#,
        )
        .unwrap();

        assert_eq!(2, config.clinic.n_pcp);
        assert_eq!(0.5, config.clinic.prob_depression);
        assert_eq!(1.0 / 60.0, config.clinic.mean_arrival_time);
        assert_eq!(Some(17), config.simulation.seed);
        assert!(config.simulation.trace_on);
        assert!(config.simulation.stop_when_drained);
        assert!(config.simulation.patient_summary);
        assert_eq!(5, config.simulation.trace_decimals);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for document in [
            "[clinic]\nn_pcp = 0",
            "[clinic]\nmean_exam_duration = 0.0",
            "[clinic]\nmean_arrival_time = -1.0",
            "[clinic]\nprob_depression = 1.5",
            "[clinic]\nhours_open = -2.0",
            "[simulation]\nsim_duration = -1.0",
            "[clinic]\nhours_open = inf",
            "[simulation]\nsim_duration = inf",
            "[simulation]\nsim_duration = nan",
        ] {
            assert!(
                matches!(ClinicConfig::from_toml_str(document), Err(ConfigError::Invalid(_))),
                "accepted {document:?}"
            );
        }
    }

    #[test]
    fn unbounded_runs_are_rejected() {
        let mut config = ClinicConfig::default();
        config.simulation.sim_duration = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ClinicConfig::default();
        config.clinic.hours_open = f64::INFINITY;
        config.simulation.stop_when_drained = true;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ClinicConfig::from_toml_str("[clinic\nn_pcp = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn load_config_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[clinic]\nn_pcp = 3").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(3, config.clinic.n_pcp);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config(dir.path().join("absent.toml")), Err(ConfigError::Io(_))));
    }
}
