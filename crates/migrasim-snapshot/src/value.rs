//! Semantic snapshot value types (§6).
//!
//! These are plain, serializable records describing a world at a
//! point in time -- no wire format is produced here, just the value
//! types a wire format (JSON, YAML, whatever a caller wants) could
//! later be bolted onto. Every id referenced inside a [`WorldPayload`]
//! (a `FactorId` in a city's intensity map, a `CityId` in an event's
//! city filter) is an arena index into that same payload's declared
//! order -- [`crate::convert::to_world`] adds factors, then cities,
//! then persons, in declaration order, so the resulting `World`'s
//! arena indices line up exactly with the indices already embedded in
//! the snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use migrasim_events::{Effect, LazyValueSpec, Trigger};
use migrasim_kernel::StandardModelConfig;
use migrasim_types::{CityId, FactorId, Polarity, Transform, UnitValue};
use serde::{Deserialize, Serialize};

/// Where a world is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    /// Freshly constructed, no steps run yet.
    Seed,
    /// Mid-run.
    Active,
    /// The stability detector declared the run converged.
    Stabilized,
    /// Ran to its configured step limit.
    Completed,
}

/// A named point in a run's history, recorded for later inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// A short label for this checkpoint.
    pub label: String,
    /// The simulation step it was recorded at.
    pub step: u64,
    /// Wall-clock time it was recorded at.
    pub recorded_at: DateTime<Utc>,
}

/// One factor definition, in the order factors are added to the
/// resulting `World` -- this order is what every `FactorId` embedded
/// elsewhere in the payload is an index into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDefinitionRecord {
    /// Display name.
    pub name: String,
    /// Whether higher raw intensity helps or hurts attraction.
    pub polarity: Polarity,
    /// The transform applied to raw intensity. Defaults to `Linear`
    /// when omitted from a hand-authored YAML document.
    #[serde(default = "default_transform")]
    pub transform: Transform,
}

const fn default_transform() -> Transform {
    Transform::Linear
}

/// Which concrete `Person` variant a template produces, and the extra
/// tuning knobs a `Standard` person carries.
///
/// Every numeric field is a [`LazyValueSpec`] rather than a bare
/// `f64`: an individual person spec uses `LazyValueSpec::Fixed` for a
/// deterministic value, and a generator spec uses `InRange` or
/// `Approximately` for the same field, with no separate schema for the
/// two cases (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersonVariantTemplate {
    /// Produces [`migrasim_persons::BasePerson`] instances.
    Base,
    /// Produces [`migrasim_persons::StandardPerson`] instances.
    Standard {
        /// Multiplier applied to base attraction before clamping.
        sensitivity_scaling: LazyValueSpec,
        /// Minimum adjusted-attraction delta required to consider a
        /// candidate city.
        attraction_threshold: LazyValueSpec,
        /// Minimum adjusted attraction a candidate city must clear.
        min_acceptable_attraction: LazyValueSpec,
    },
}

/// A template from which one or more persons are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonTemplate {
    /// Which variant, and its extra tuning knobs.
    pub variant: PersonVariantTemplate,
    /// Per-factor sensitivity. A factor this world defines but this
    /// map omits is filled with a neutral default by `World::add_person`,
    /// exactly as for a hand-built `Person`.
    #[serde(default)]
    pub sensitivities: BTreeMap<FactorId, LazyValueSpec>,
    /// Scalar propensity to move at all.
    pub moving_willingness: LazyValueSpec,
    /// Scalar attachment to the current city.
    pub retention_rate: LazyValueSpec,
    /// Short descriptive tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A named group of persons: a single individual, a fixed count of
/// independently-generated individuals sharing a template, or a
/// generator meant to stand in for a much larger population without
/// snapshotting every instance (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersonSpec {
    /// One person, evaluated once against `seed`.
    Individual {
        /// The person's template.
        template: PersonTemplate,
        /// Seed for evaluating any lazy fields in the template.
        seed: u64,
    },
    /// `count` independently-evaluated instances of one template.
    Repeated {
        /// How many instances to produce.
        count: u32,
        /// The shared template.
        template: PersonTemplate,
        /// Seed for evaluating each instance's lazy fields; instance
        /// `i` uses a sub-stream derived from `(seed, i)`.
        seed: u64,
    },
    /// A generative rule standing in for a population too large to
    /// snapshot instance-by-instance.
    Generator {
        /// How many instances this generator stands for.
        count: u32,
        /// The generative template.
        template: PersonTemplate,
        /// Seed for evaluating each instance's lazy fields.
        seed: u64,
    },
}

/// A named collection of person specs, referenced by name from one or
/// more [`CityRecord`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonCollectionSpec {
    /// Display name, referenced from [`CityRecord::population_refs`].
    pub name: String,
    /// The specs making up this collection.
    pub persons: Vec<PersonSpec>,
}

/// One city, in the order cities are added to the resulting `World`
/// -- this order is what every `CityId` embedded elsewhere in the
/// payload is an index into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Descriptive area in square kilometers. Carried for reference
    /// and possible future density calculations; the current world
    /// model has no consumer for it.
    #[serde(default)]
    pub area_km2: Option<f64>,
    /// Maximum resident count, if bounded.
    pub capacity: Option<u32>,
    /// Raw intensity per factor; must cover every factor this
    /// payload's `factor_definitions` declares.
    pub factor_intensities: BTreeMap<FactorId, f64>,
    /// Names of [`PersonCollectionSpec`]s whose persons start resident
    /// here.
    #[serde(default)]
    pub population_refs: Vec<String>,
}

/// One scheduled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Display name.
    pub name: String,
    /// The trigger gating this event's effects.
    pub trigger: Trigger,
    /// The effects applied when the trigger fires.
    pub effects: Vec<Effect>,
    /// Whether a one-shot trigger has already fired.
    #[serde(default)]
    pub completed: bool,
}

/// The world content portion of a snapshot: everything needed to
/// reconstruct a `World` plus its scheduled events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPayload {
    /// Factor definitions, in arena order.
    pub factor_definitions: Vec<FactorDefinitionRecord>,
    /// Named person collections.
    #[serde(default)]
    pub person_collections: Vec<PersonCollectionSpec>,
    /// Cities, in arena order.
    pub cities: Vec<CityRecord>,
    /// Scheduled events.
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// A complete, versioned snapshot of a simulation run (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version, for forward compatibility.
    pub version: String,
    /// Lifecycle status.
    pub status: SnapshotStatus,
    /// When this snapshot was first created.
    pub created_at: DateTime<Utc>,
    /// When this snapshot was last modified.
    pub modified_at: DateTime<Utc>,
    /// The simulation step this snapshot represents.
    pub current_step: u64,
    /// The master seed in use; replaying `current_step` steps from a
    /// world built with this seed reproduces this snapshot's state
    /// byte-for-byte.
    pub master_seed: u64,
    /// Named points in this run's history.
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    /// The world content.
    pub world: WorldPayload,
    /// The attraction/migration model config used to produce this
    /// snapshot, for reproducibility.
    pub model_config: Option<StandardModelConfig>,
    /// The engine config used to produce this snapshot, for
    /// reproducibility. Kept as an opaque blob rather than a
    /// `migrasim-engine` type to avoid this crate depending on the
    /// engine crate that depends on it for world construction.
    pub engine_config: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_payload_default_is_empty() {
        let payload = WorldPayload::default();
        assert!(payload.factor_definitions.is_empty());
        assert!(payload.cities.is_empty());
        assert!(payload.person_collections.is_empty());
        assert!(payload.events.is_empty());
    }

    #[test]
    fn factor_definition_record_serde_roundtrip() {
        let record = FactorDefinitionRecord {
            name: "jobs".to_owned(),
            polarity: Polarity::Positive,
            transform: Transform::Linear,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let restored: FactorDefinitionRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, restored);
    }

    #[test]
    fn person_spec_with_factor_id_keyed_sensitivities_roundtrips() {
        let template = PersonTemplate {
            variant: PersonVariantTemplate::Base,
            sensitivities: BTreeMap::from([(FactorId::from_index(0), LazyValueSpec::Fixed(0.5))]),
            moving_willingness: LazyValueSpec::Fixed(0.8),
            retention_rate: LazyValueSpec::Fixed(0.1),
            tags: vec!["newcomer".to_owned()],
        };
        let spec = PersonSpec::Individual { template, seed: 7 };
        let json = serde_json::to_string(&spec).expect("serialize");
        let restored: PersonSpec = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(spec, restored);
    }

    #[test]
    fn city_record_references_cities_and_factors_by_arena_index() {
        let record = CityRecord {
            name: "Springfield".to_owned(),
            latitude: 39.78,
            longitude: -89.65,
            area_km2: Some(150.0),
            capacity: Some(10_000),
            factor_intensities: BTreeMap::from([(FactorId::from_index(0), 0.6)]),
            population_refs: vec!["founders".to_owned()],
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let restored: CityRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, restored);
    }

    #[test]
    fn event_record_embeds_trigger_and_effects_directly() {
        let record = EventRecord {
            name: "boom".to_owned(),
            trigger: Trigger::Step(10),
            effects: vec![Effect::FactorChange {
                factor: FactorId::from_index(0),
                value_producer: migrasim_events::ValueProducer::Immediate(UnitValue::ONE),
                application_type: migrasim_types::ApplicationType::Absolute,
                duration: None,
                city_filter: Some(vec![CityId::from_index(0)]),
            }],
            completed: false,
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let restored: EventRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(record, restored);
    }
}
