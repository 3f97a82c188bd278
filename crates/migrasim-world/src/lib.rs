//! Cities, factor definitions, distance, and the `World` aggregate for
//! the migration simulation.
//!
//! This crate models the static and resident-tracking parts of the
//! world graph: cities as nodes, factor definitions as the dimensions
//! of attractiveness, a pluggable distance calculator, and the `World`
//! aggregate that enforces the data model's residency invariants. The
//! attraction/migration math itself lives in the kernel crate, which
//! depends on this one.
//!
//! # Modules
//!
//! - [`factor`] -- [`FactorDefinition`]
//! - [`city`] -- [`City`]
//! - [`distance`] -- [`DistanceCalculator`], [`HaversineCalculator`]
//! - [`world`] -- [`World`]
//! - [`error`] -- [`WorldError`]

pub mod city;
pub mod distance;
pub mod error;
pub mod factor;
pub mod world;

pub use city::City;
pub use distance::{DistanceCalculator, HaversineCalculator};
pub use error::WorldError;
pub use factor::FactorDefinition;
pub use world::World;
