//! Engine-level simulation configuration (§4.1, §6, §7.2).
//!
//! Mirrors the teacher pack's per-concern config-struct idiom
//! (`emergence-core::config::SimulationConfig`): a plain
//! `serde::Deserialize` struct with `#[serde(default = "...")]` per
//! field and a matching `Default` impl, loaded from YAML via
//! `serde_yml`. Validation happens in a dedicated method rather than
//! a derive-based validator crate, the same choice the teacher's own
//! config module makes.

use std::path::Path;

use serde::Deserialize;

/// Errors validating a [`SimulationConfig`]'s field values (a
/// `ConfigurationError` kind, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `max_steps` was zero.
    #[error("max_steps must be >= 1")]
    InvalidMaxSteps,
    /// `stability_check_interval` was zero.
    #[error("stability_check_interval must be >= 1")]
    InvalidStabilityCheckInterval,
    /// `min_steps_before_stability_check` was not strictly less than
    /// `max_steps`.
    #[error("min_steps_before_stability_check must be < max_steps")]
    MinStepsNotBelowMaxSteps,
}

/// Errors loading a [`SimulationConfig`] from a YAML file or string.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yml::Error),
    /// The parsed configuration failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Top-level simulation run configuration (§4.1 "Configuration").
///
/// The attraction/migration math coefficients live on
/// `migrasim_kernel::StandardModelConfig` instead; this struct only
/// covers the pipeline's own run-length, stability, capacity-policy,
/// and concurrency knobs, so execution-stage concerns never get
/// conflated with the attraction formula's tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Maximum steps before the run halts with `MaxStepsReached`
    /// (default 1000).
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Random seed driving every deterministic sub-stream this run
    /// derives (default 0).
    #[serde(default)]
    pub master_seed: u64,
    /// Whether the stability detector is consulted at all (default
    /// true).
    #[serde(default = "default_true")]
    pub check_stability: bool,
    /// Maximum `TotalPopulationChange` still considered stabilized
    /// (default 10).
    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: u64,
    /// Stability is only checked every `stability_check_interval`
    /// steps (default 1).
    #[serde(default = "default_stability_check_interval")]
    pub stability_check_interval: u64,
    /// No stability check runs before this step (default 0).
    #[serde(default)]
    pub min_steps_before_stability_check: u64,
    /// Whether `ExecutionStage` enforces destination capacity as a
    /// hard limit rather than the default soft-capacity policy
    /// (default false, §4.4′).
    #[serde(default)]
    pub enforce_capacity: bool,
    /// Whether `EventStage` fans its due-event computation out over
    /// rayon (default false, §9 "Event concurrency").
    #[serde(default)]
    pub use_parallel_events: bool,
    /// Caps the rayon thread pool's worker count for this run;
    /// `None` uses rayon's global pool sizing (default `None`).
    #[serde(default)]
    pub max_parallelism: Option<usize>,
}

impl SimulationConfig {
    /// Validate this configuration's field relationships.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_steps` is zero,
    /// `stability_check_interval` is zero, or
    /// `min_steps_before_stability_check` is not strictly less than
    /// `max_steps`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidMaxSteps);
        }
        if self.stability_check_interval == 0 {
            return Err(ConfigError::InvalidStabilityCheckInterval);
        }
        if self.min_steps_before_stability_check >= self.max_steps {
            return Err(ConfigError::MinStepsNotBelowMaxSteps);
        }
        Ok(())
    }

    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] if the file cannot be read, is not
    /// valid YAML, or fails [`Self::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] if the string is not valid YAML or
    /// fails [`Self::validate`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            master_seed: 0,
            check_stability: true,
            stability_threshold: default_stability_threshold(),
            stability_check_interval: default_stability_check_interval(),
            min_steps_before_stability_check: 0,
            enforce_capacity: false,
            use_parallel_events: false,
            max_parallelism: None,
        }
    }
}

const fn default_max_steps() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

const fn default_stability_threshold() -> u64 {
    10
}

const fn default_stability_check_interval() -> u64 {
    1
}
