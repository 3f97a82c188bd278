//! Error types for the `migrasim-kernel` crate.

use migrasim_types::{CityId, FactorId, PersonId};

/// Errors that can occur while computing attraction or migration
/// decisions.
///
/// Per the specification's `DecisionError` kind: a NaN/infinite result
/// or a malformed lookup here does not abort the run. The caller (the
/// decision stage) treats the offending person as staying and reports
/// the error through the observer surface; it never propagates as a
/// hard failure the way a [`migrasim_world::WorldError`] does.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    /// A city in the world did not carry an intensity for a factor the
    /// world defines (should not happen given `World`'s invariants, but
    /// the calculator checks rather than indexing blindly).
    #[error("city {city} is missing an intensity for factor {factor}")]
    MissingFactorIntensity {
        /// The city in question.
        city: CityId,
        /// The missing factor.
        factor: FactorId,
    },

    /// A city id did not refer to any city in the world.
    #[error("city not found: {0}")]
    CityNotFound(CityId),

    /// A person id did not refer to any person in the world.
    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    /// A person has no current city, so no origin-relative attraction
    /// or migration decision can be computed for them.
    #[error("person {0} has no current city")]
    NoCurrentCity(PersonId),

    /// An arena index could not be converted (the arena exceeded
    /// `u32::MAX` entries).
    #[error("arena index overflow")]
    ArenaIndexOverflow,

    /// An attraction or migration computation produced a non-finite
    /// result (NaN or infinite). The affected person is treated as
    /// staying.
    #[error("non-finite result computing {context} for person {person}")]
    NonFiniteResult {
        /// What was being computed (e.g. "base attraction").
        context: &'static str,
        /// The affected person.
        person: PersonId,
    },
}
