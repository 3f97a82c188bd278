//! Tuning configuration for the standard attraction and migration
//! calculators.
//!
//! Mirrors the teacher pack's per-concern config-struct-with-defaults
//! idiom (`emergence-agents::config::VitalsConfig`): one struct, one
//! `Default` impl, doc comments stating the default inline, and a
//! `validate`/`try_new` constructor rather than a derive-based
//! validator (§7.2).

/// Validated tuning knobs for [`crate::attraction::StandardAttractionCalculator`]
/// and [`crate::migration::StandardMigrationCalculator`] (§6 "CLI/config
/// surface").
///
/// Serializable directly so a snapshot can embed the model config that
/// produced it for reproducibility (§6).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StandardModelConfig {
    capacity_steepness: f64,
    distance_decay_lambda: f64,
    migration_probability_steepness: f64,
    migration_probability_threshold: f64,
    factor_smoothing_alpha: f64,
}

/// Errors constructing a [`StandardModelConfig`] (`ConfigurationError`,
/// §7).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ModelConfigError {
    /// `capacity_steepness` was negative or non-finite.
    #[error("capacity_steepness must be finite and >= 0, got {0}")]
    InvalidCapacitySteepness(f64),
    /// `distance_decay_lambda` was negative or non-finite.
    #[error("distance_decay_lambda must be finite and >= 0, got {0}")]
    InvalidDistanceDecayLambda(f64),
    /// `migration_probability_steepness` was negative or non-finite.
    #[error("migration_probability_steepness must be finite and >= 0, got {0}")]
    InvalidMigrationProbabilitySteepness(f64),
    /// `migration_probability_threshold` was non-finite.
    #[error("migration_probability_threshold must be finite, got {0}")]
    InvalidMigrationProbabilityThreshold(f64),
    /// `factor_smoothing_alpha` was outside `[0, 1]` or non-finite.
    #[error("factor_smoothing_alpha must be finite and in [0, 1], got {0}")]
    InvalidFactorSmoothingAlpha(f64),
}

impl StandardModelConfig {
    /// Construct a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ModelConfigError`] if any coefficient is non-finite or
    /// outside its documented range.
    pub fn try_new(
        capacity_steepness: f64,
        distance_decay_lambda: f64,
        migration_probability_steepness: f64,
        migration_probability_threshold: f64,
        factor_smoothing_alpha: f64,
    ) -> Result<Self, ModelConfigError> {
        if !capacity_steepness.is_finite() || capacity_steepness < 0.0 {
            return Err(ModelConfigError::InvalidCapacitySteepness(capacity_steepness));
        }
        if !distance_decay_lambda.is_finite() || distance_decay_lambda < 0.0 {
            return Err(ModelConfigError::InvalidDistanceDecayLambda(distance_decay_lambda));
        }
        if !migration_probability_steepness.is_finite() || migration_probability_steepness < 0.0 {
            return Err(ModelConfigError::InvalidMigrationProbabilitySteepness(
                migration_probability_steepness,
            ));
        }
        if !migration_probability_threshold.is_finite() {
            return Err(ModelConfigError::InvalidMigrationProbabilityThreshold(
                migration_probability_threshold,
            ));
        }
        if !factor_smoothing_alpha.is_finite() || !(0.0..=1.0).contains(&factor_smoothing_alpha) {
            return Err(ModelConfigError::InvalidFactorSmoothingAlpha(factor_smoothing_alpha));
        }
        Ok(Self {
            capacity_steepness,
            distance_decay_lambda,
            migration_probability_steepness,
            migration_probability_threshold,
            factor_smoothing_alpha,
        })
    }

    /// Steepness `s` of the capacity-resistance sigmoid (default 5.0).
    #[must_use]
    pub const fn capacity_steepness(&self) -> f64 {
        self.capacity_steepness
    }

    /// Decay coefficient `λ` (per km) of the distance-resistance
    /// exponential (default 0.001).
    #[must_use]
    pub const fn distance_decay_lambda(&self) -> f64 {
        self.distance_decay_lambda
    }

    /// Steepness `k` of the migration-probability softmax/sigmoid
    /// (default 10.0).
    #[must_use]
    pub const fn migration_probability_steepness(&self) -> f64 {
        self.migration_probability_steepness
    }

    /// Threshold subtracted from each candidate's delta before the
    /// softmax/sigmoid (default 0.0).
    #[must_use]
    pub const fn migration_probability_threshold(&self) -> f64 {
        self.migration_probability_threshold
    }

    /// Smoothing factor applied by the event engine when a factor
    /// change effect ramps a value gradually rather than snapping it
    /// (default 0.2). Not used by the attraction/migration math
    /// itself; exposed here since it is one of the same five tunables
    /// the specification groups under `StandardModelConfig` (§6).
    #[must_use]
    pub const fn factor_smoothing_alpha(&self) -> f64 {
        self.factor_smoothing_alpha
    }
}

impl Default for StandardModelConfig {
    fn default() -> Self {
        Self {
            capacity_steepness: 5.0,
            distance_decay_lambda: 0.001,
            migration_probability_steepness: 10.0,
            migration_probability_threshold: 0.0,
            factor_smoothing_alpha: 0.2,
        }
    }
}
