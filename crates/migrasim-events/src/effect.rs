//! Value producers and factor-change effects the event stage applies
//! to city state (§4.5).

use migrasim_types::{ApplicationType, CityId, FactorId, UnitValue};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// A scalar evaluated once per application rather than fixed ahead of
/// time.
///
/// Serializable directly, so a person generator spec (§6) can embed a
/// `LazyValueSpec` per field without a duplicate schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LazyValueSpec {
    /// Always evaluates to the same value.
    Fixed(f64),
    /// Uniformly distributed across `[min, max]`.
    InRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Approximately normally distributed around `mean` with the given
    /// `stddev`, via a Box-Muller transform.
    Approximately {
        /// Center of the distribution.
        mean: f64,
        /// Spread of the distribution.
        stddev: f64,
    },
}

impl LazyValueSpec {
    /// Evaluate this spec once, drawing from `rng` as needed.
    #[must_use]
    pub fn evaluate(&self, rng: &mut dyn RngCore) -> f64 {
        match *self {
            Self::Fixed(value) => value,
            Self::InRange { min, max } => {
                if max <= min {
                    min
                } else {
                    min + rng.random::<f64>() * (max - min)
                }
            }
            Self::Approximately { mean, stddev } => {
                let u1 = rng.random::<f64>().max(f64::MIN_POSITIVE);
                let u2 = rng.random::<f64>();
                let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
                mean + z * stddev
            }
        }
    }
}

/// Where a [`Effect::FactorChange`]'s target value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValueProducer {
    /// An immediate, already-known unit value.
    Immediate(UnitValue),
    /// A value computed once per application.
    Lazy(LazyValueSpec),
}

impl ValueProducer {
    /// Produce a unit value, saturating the result into range.
    #[must_use]
    pub fn produce(&self, rng: &mut dyn RngCore) -> UnitValue {
        match self {
            Self::Immediate(value) => *value,
            Self::Lazy(spec) => UnitValue::saturating(spec.evaluate(rng)),
        }
    }
}

/// A scheduled mutation to one or more cities' factor intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Change one factor's intensity, optionally over a transition
    /// window.
    FactorChange {
        /// The factor being changed.
        factor: FactorId,
        /// Where the target value comes from.
        value_producer: ValueProducer,
        /// How the produced value combines with the current intensity.
        application_type: ApplicationType,
        /// For `LinearTransition`/`LogarithmicTransition`: the number
        /// of steps the transition runs over.
        duration: Option<u32>,
        /// Cities this effect applies to; `None` means every city in
        /// the world.
        city_filter: Option<Vec<CityId>>,
    },
    /// Apply every child in order. Transactional within one event: see
    /// [`crate::event::Event::fire`].
    Composite(Vec<Effect>),
}

impl Effect {
    /// Collect every factor that some transition effect in this tree
    /// targets, so the owning event knows which origin values to
    /// capture on first fire.
    pub(crate) fn collect_transition_factors(&self, out: &mut Vec<FactorId>) {
        match self {
            Self::FactorChange {
                factor,
                application_type,
                ..
            } => {
                if matches!(
                    application_type,
                    ApplicationType::LinearTransition | ApplicationType::LogarithmicTransition
                ) {
                    out.push(*factor);
                }
            }
            Self::Composite(children) => {
                for child in children {
                    child.collect_transition_factors(out);
                }
            }
        }
    }

    /// This effect's transition duration, if it is a transition effect
    /// (the longest among a `Composite`'s children, if more than one).
    pub(crate) fn transition_duration(&self) -> Option<u32> {
        match self {
            Self::FactorChange {
                application_type,
                duration,
                ..
            } => matches!(
                application_type,
                ApplicationType::LinearTransition | ApplicationType::LogarithmicTransition
            )
            .then_some(*duration)
            .flatten(),
            Self::Composite(children) => children.iter().filter_map(Self::transition_duration).max(),
        }
    }
}

/// Linear transition progress fraction in `[0, 1]`.
///
/// # Errors
///
/// Returns [`EventError::InvalidDuration`] if `duration` is zero.
pub(crate) fn linear_progress(elapsed: u32, duration: u32) -> Result<f64, EventError> {
    if duration == 0 {
        return Err(EventError::InvalidDuration);
    }
    Ok((f64::from(elapsed) / f64::from(duration)).clamp(0.0, 1.0))
}

/// Logarithmic transition progress: `log2(1 + elapsed/duration)`,
/// clamped to `[0, 1]` since the curve exceeds 1 once `elapsed >
/// duration`.
///
/// # Errors
///
/// Returns [`EventError::InvalidDuration`] if `duration` is zero.
pub(crate) fn logarithmic_progress(elapsed: u32, duration: u32) -> Result<f64, EventError> {
    if duration == 0 {
        return Err(EventError::InvalidDuration);
    }
    let ratio = f64::from(elapsed) / f64::from(duration);
    Ok((1.0 + ratio).log2().clamp(0.0, 1.0))
}
