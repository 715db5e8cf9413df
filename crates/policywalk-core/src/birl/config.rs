use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::birl::{error::BirlError, prior::PriorKind};

const DEFAULT_BIRL_CONFIG_YAML: &str = include_str!("../../config/birl.default.yaml");

/// Hyperparameters of a PolicyWalk run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BirlConfig {
    /// Lattice spacing for reward and transition-weight moves.
    pub step_size: f64,
    pub iterations: usize,
    /// Iterations discarded before samples are recorded.
    pub burn_in: usize,
    /// Record every `sample_freq`-th iteration after burn-in.
    pub sample_freq: usize,
    /// Bound on every reward and transition-weight coordinate.
    pub r_max: f64,
    /// Length of the reward vector.
    pub d_states: usize,
    /// Boltzmann rationality of the demonstrator.
    pub rationality: f64,
    pub prior: PriorKind,
    pub seed: u64,
}

impl Default for BirlConfig {
    fn default() -> Self {
        BirlConfig {
            step_size: 0.5,
            iterations: 1000,
            burn_in: 100,
            sample_freq: 10,
            r_max: 1.0,
            d_states: 1,
            rationality: 1.0,
            prior: PriorKind::Uniform,
            seed: 0,
        }
    }
}

impl BirlConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BirlError> {
        let config: BirlConfig = serde_yaml::from_str(yaml).map_err(ConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, BirlError> {
        let yaml = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_BIRL_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, BirlError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Reject configurations the sampler cannot run with.
    pub fn validate(&self) -> Result<(), BirlError> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(invalid("step_size must be finite and > 0"));
        }
        if !self.r_max.is_finite() || self.r_max <= 0.0 {
            return Err(invalid("r_max must be finite and > 0"));
        }
        if self.iterations == 0 {
            return Err(invalid("iterations must be greater than 0"));
        }
        if self.sample_freq == 0 {
            return Err(invalid("sample_freq must be greater than 0"));
        }
        if self.burn_in >= self.iterations {
            return Err(invalid("burn_in must be smaller than iterations"));
        }
        if self.d_states == 0 {
            return Err(invalid("d_states must be greater than 0"));
        }
        if !self.rationality.is_finite() {
            return Err(invalid("rationality must be finite"));
        }
        if self.prior != PriorKind::Uniform {
            return Err(BirlError::UnsupportedPrior { prior: self.prior });
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> BirlError {
    ConfigError::Invalid(reason.to_string()).into()
}

/// Error type for loading and validating `BirlConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[source] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[error("invalid birl config: {0}")]
    Invalid(String),
}
