//! Attraction and migration decision calculators for the migration
//! simulation.
//!
//! This crate holds the pure decision math (§4.3, §4.4): given a
//! `World` snapshot, how attractive is a city to a person, and does
//! that person migrate this step. Nothing here mutates a `World` --
//! the decision stage in `migrasim-engine` is the caller that turns a
//! [`migration::MigrationFlow`] into an actual move.
//!
//! # Modules
//!
//! - [`attraction`] -- [`attraction::AttractionCalculator`], [`attraction::AttractionResult`]
//! - [`migration`] -- [`migration::MigrationCalculator`], [`migration::MigrationFlow`]
//! - [`config`] -- [`config::StandardModelConfig`]
//! - [`rng`] -- deterministic per-person RNG sub-streams
//! - [`error`] -- [`error::DecisionError`]

pub mod attraction;
pub mod config;
pub mod error;
pub mod migration;
pub mod rng;

pub use attraction::{AttractionCalculator, AttractionResult, StandardAttractionCalculator};
pub use config::{ModelConfigError, StandardModelConfig};
pub use error::DecisionError;
pub use migration::{calculate_all_migration_flows, MigrationCalculator, MigrationFlow, StandardMigrationCalculator};
pub use rng::{person_rng, sub_seed};
