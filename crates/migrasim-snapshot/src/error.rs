//! Error types for the `migrasim-snapshot` crate.

use migrasim_persons::PersonError;
use migrasim_types::CoordinateError;
use migrasim_world::WorldError;

/// Errors raised while converting between a snapshot and a live
/// `World`.
///
/// All of these are `ConfigurationError`/`DomainInvariantError` kinds
/// (§7): a malformed snapshot fails the conversion outright rather
/// than being locally recovered, since a half-built world is not safe
/// to simulate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    /// A city referenced a person-collection name with no matching
    /// entry in `world.person_collections`.
    #[error("unknown person collection: {0}")]
    UnknownPersonCollection(String),

    /// A city's coordinate was invalid.
    #[error("invalid city coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    /// A city's factor intensity was outside `[0, 1]` or non-finite.
    #[error("invalid factor intensity {value} for factor index {factor}")]
    InvalidFactorIntensity {
        /// Arena index of the offending factor.
        factor: u32,
        /// The out-of-range or non-finite value.
        value: f64,
    },

    /// A person template produced an invalid person.
    #[error("invalid person: {0}")]
    InvalidPerson(#[from] PersonError),

    /// A person template's lazy value spec evaluated to a non-finite
    /// number.
    #[error("person template field {field} evaluated to a non-finite value")]
    NonFiniteGeneratedValue {
        /// Name of the offending field, for diagnostics.
        field: &'static str,
    },

    /// Building the world itself rejected an operation (e.g. a city
    /// missing factor coverage, a mixed person variant).
    #[error("world construction failed: {0}")]
    World(#[from] WorldError),
}
