//! Error types for the `migrasim-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through
//! the standard [`Result`] type alias.

use migrasim_types::{CityId, FactorId, PersonId};

/// Errors that can occur during world, city, and factor operations.
///
/// These correspond to the specification's `ConfigurationError` and
/// `DomainInvariantError` kinds: every variant here fails construction
/// or the offending operation outright rather than recovering locally,
/// since an invalid world is not safe to keep simulating.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// A city's factor-intensity map does not cover every factor
    /// definition in the world (data model invariant 1).
    #[error("city is missing a factor intensity for factor {0}")]
    MissingFactorIntensity(FactorId),

    /// A city's factor-intensity map references a factor the world
    /// does not define.
    #[error("factor {0} is not defined in this world")]
    UnknownFactor(FactorId),

    /// A factor intensity value was not finite.
    #[error("factor {factor} intensity is not finite")]
    NonFiniteIntensity {
        /// The offending factor.
        factor: FactorId,
    },

    /// A city id did not refer to any city in this world.
    #[error("city not found: {0}")]
    CityNotFound(CityId),

    /// A person id did not refer to any person in this world.
    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    /// Attempted to place a person who already has a current city
    /// (data model invariant 4 — "adding a person to two cities").
    #[error("person {person} is already resident in a city")]
    AlreadyResident {
        /// The person in question.
        person: PersonId,
    },

    /// Attempted to remove a person from a city they are not a
    /// resident of (indicates a bookkeeping bug in the caller).
    #[error("person {person} is not resident in city {city}")]
    NotResident {
        /// The person in question.
        person: PersonId,
        /// The city they were expected to be in.
        city: CityId,
    },

    /// A second concrete person variant was introduced into a world
    /// that already has a different one (data model invariant 3:
    /// "all persons in a world are of one concrete person variant").
    #[error("world already contains persons of a different variant")]
    MixedPersonVariant,

    /// An arithmetic overflow occurred during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,

    /// A city has no remaining capacity for another resident.
    #[error("city has no remaining capacity")]
    CityAtCapacity,
}
