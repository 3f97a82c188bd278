//! A small built-in demo scenario, used when no `migrasim-scenario.yaml`
//! is present on disk.
//!
//! Three cities connected by one positive factor (`jobs`) and one
//! negative factor (`pollution`), populated by a single generator
//! collection per city so the demo run has enough people to produce
//! visible migration without hand-authoring individuals.

use std::collections::BTreeMap;

use migrasim_events::{Effect, LazyValueSpec, Trigger, ValueProducer};
use migrasim_types::{ApplicationType, FactorId, Polarity, Transform, UnitValue};
use migrasim_snapshot::{
    CityRecord, FactorDefinitionRecord, PersonCollectionSpec, PersonSpec, PersonTemplate, PersonVariantTemplate,
    WorldPayload,
};

const JOBS: FactorId = FactorId::from_index(0);
const POLLUTION: FactorId = FactorId::from_index(1);

fn base_template(job_sensitivity: f64, pollution_sensitivity: f64, moving_willingness: f64, retention_rate: f64) -> PersonTemplate {
    PersonTemplate {
        variant: PersonVariantTemplate::Base,
        sensitivities: BTreeMap::from([
            (JOBS, LazyValueSpec::Approximately { mean: job_sensitivity, stddev: 0.1 }),
            (POLLUTION, LazyValueSpec::Approximately { mean: pollution_sensitivity, stddev: 0.1 }),
        ]),
        moving_willingness: LazyValueSpec::Approximately { mean: moving_willingness, stddev: 0.05 },
        retention_rate: LazyValueSpec::Approximately { mean: retention_rate, stddev: 0.05 },
        tags: Vec::new(),
    }
}

fn city(name: &str, latitude: f64, longitude: f64, capacity: u32, jobs: f64, pollution: f64, collection: &str) -> CityRecord {
    CityRecord {
        name: name.to_owned(),
        latitude,
        longitude,
        area_km2: None,
        capacity: Some(capacity),
        factor_intensities: BTreeMap::from([(JOBS, jobs), (POLLUTION, pollution)]),
        population_refs: vec![collection.to_owned()],
    }
}

/// Build the demo world payload: a boomtown, a declining industrial
/// city, and a quiet suburb, with 150 persons spread across them.
#[must_use]
pub fn built_in_demo() -> WorldPayload {
    let factor_definitions = vec![
        FactorDefinitionRecord {
            name: "jobs".to_owned(),
            polarity: Polarity::Positive,
            transform: Transform::Linear,
        },
        FactorDefinitionRecord {
            name: "pollution".to_owned(),
            polarity: Polarity::Negative,
            transform: Transform::Linear,
        },
    ];

    let person_collections = vec![
        PersonCollectionSpec {
            name: "boomtown-residents".to_owned(),
            persons: vec![PersonSpec::Generator {
                count: 60,
                template: base_template(0.7, 0.3, 0.4, 0.4),
                seed: 1,
            }],
        },
        PersonCollectionSpec {
            name: "rustbelt-residents".to_owned(),
            persons: vec![PersonSpec::Generator {
                count: 70,
                template: base_template(0.6, 0.6, 0.6, 0.2),
                seed: 2,
            }],
        },
        PersonCollectionSpec {
            name: "suburb-residents".to_owned(),
            persons: vec![PersonSpec::Generator {
                count: 20,
                template: base_template(0.3, 0.4, 0.2, 0.7),
                seed: 3,
            }],
        },
    ];

    let cities = vec![
        city("Boomtown", 37.77, -122.42, 500, 0.9, 0.2, "boomtown-residents"),
        city("Rustbelt City", 41.49, -81.69, 500, 0.2, 0.8, "rustbelt-residents"),
        city("Quiet Suburb", 39.10, -84.51, 200, 0.5, 0.1, "suburb-residents"),
    ];

    let events = vec![migrasim_snapshot::EventRecord {
        name: "rustbelt cleanup".to_owned(),
        trigger: Trigger::Step(20),
        effects: vec![Effect::FactorChange {
            factor: POLLUTION,
            value_producer: ValueProducer::Immediate(UnitValue::saturating(0.3)),
            application_type: ApplicationType::LinearTransition,
            duration: Some(30),
            city_filter: Some(vec![migrasim_types::CityId::from_index(1)]),
        }],
        completed: false,
    }];

    WorldPayload {
        factor_definitions,
        person_collections,
        cities,
        events,
    }
}
