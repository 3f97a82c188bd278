//! Shared type definitions for the migrasim simulation.
//!
//! This crate is the single source of truth for identity, the
//! unit-interval scalar, coordinates, and the small enumerations that
//! every other crate in the workspace depends on.
//!
//! # Modules
//!
//! - [`ids`] -- arena-index identifiers for persons, cities, and factor definitions
//! - [`unit`] -- the clamping unit-interval scalar, [`UnitValue`]
//! - [`coordinate`] -- geographic coordinates
//! - [`enums`] -- polarity, factor transforms, and effect application types

pub mod coordinate;
pub mod enums;
pub mod ids;
pub mod unit;

pub use coordinate::{Coordinate, CoordinateError, EARTH_RADIUS_KM};
pub use enums::{ApplicationType, Polarity, Transform};
pub use ids::{CityId, FactorId, PersonId};
pub use unit::{NotFiniteError, UnitValue};
