//! Semantic snapshot value types and deterministic world conversion
//! (§6).
//!
//! A [`value::Snapshot`] is a pure value -- no XML/JSON wire format is
//! produced here, just `serde`-derived value types a wire format could
//! later be bolted onto. [`convert::to_world`] and
//! [`convert::to_snapshot_payload`] are the only conversions this
//! crate performs, and they are deterministic given the snapshot's
//! recorded master seed and per-collection seeds.
//!
//! # Modules
//!
//! - [`value`] -- [`value::Snapshot`], [`value::WorldPayload`], and the record types making it up
//! - [`convert`] -- [`convert::to_world`], [`convert::to_snapshot_payload`], [`convert::WorldBuild`]
//! - [`error`] -- [`error::SnapshotError`]

pub mod convert;
pub mod error;
pub mod value;

pub use convert::{to_snapshot_payload, to_world, WorldBuild};
pub use error::SnapshotError;
pub use value::{
    Checkpoint, CityRecord, EventRecord, FactorDefinitionRecord, PersonCollectionSpec, PersonSpec, PersonTemplate,
    PersonVariantTemplate, Snapshot, SnapshotStatus, WorldPayload,
};
