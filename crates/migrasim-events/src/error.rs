//! Error types for the `migrasim-events` crate.

use migrasim_types::{CityId, FactorId};

/// Errors raised while evaluating triggers or applying effects.
///
/// Per the `EventError` kind in the error taxonomy: these are
/// local-recovery errors. The event stage reports one through the
/// observer surface and skips the offending event for this step; the
/// run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// A `FactorChange` effect referenced a factor the world does not
    /// define.
    #[error("factor not found: {0}")]
    FactorNotFound(FactorId),

    /// A `FactorChange` effect's city filter referenced a city the
    /// world does not contain.
    #[error("city not found: {0}")]
    CityNotFound(CityId),

    /// A `LinearTransition`/`LogarithmicTransition` effect was
    /// configured with a zero duration.
    #[error("transition effect requires a positive duration")]
    InvalidDuration,

    /// A value producer evaluated to a non-finite value.
    #[error("effect produced a non-finite value")]
    NonFiniteValue,
}
