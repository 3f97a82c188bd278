//! Deterministic conversion between a [`Snapshot`] and a live
//! [`World`] plus its scheduled [`Event`]s (§6).
//!
//! `to_world` adds factor definitions, then persons, then cities, in
//! the snapshot's declared order, so every `FactorId`/`CityId` already
//! embedded in the snapshot (a city's factor intensities, an effect's
//! city filter) lines up with the arena index the resulting `World`
//! assigns. `to_snapshot` is the inverse: it fully materializes every
//! live person as an individual, `Fixed`-valued spec, grouped into one
//! collection per city (plus one for unplaced persons), since a live
//! `World` has concrete persons rather than generative rules.

use std::collections::BTreeMap;

use migrasim_events::{Event, LazyValueSpec};
use migrasim_kernel::rng::person_rng;
use migrasim_persons::{BasePerson, Person, PersonCore, StandardPerson};
use migrasim_types::{CityId, Coordinate, UnitValue};
use migrasim_world::{City, FactorDefinition, World};
use rand::RngCore;

use crate::error::SnapshotError;
use crate::value::{
    CityRecord, EventRecord, FactorDefinitionRecord, PersonCollectionSpec, PersonSpec, PersonTemplate,
    PersonVariantTemplate, WorldPayload,
};

/// The result of converting a [`WorldPayload`] into a live world: the
/// `World` itself plus the events scheduled against it, which live
/// outside `World` in this system's architecture (§4.1).
#[derive(Debug, Clone)]
pub struct WorldBuild {
    /// The constructed world.
    pub world: World,
    /// The events scheduled against it, restored to their recorded
    /// completion state.
    pub events: Vec<Event>,
}

/// Build a live world (plus its events) from a snapshot's world
/// payload.
///
/// # Errors
///
/// Returns [`SnapshotError`] if any record is malformed: an unknown
/// person-collection reference, an invalid coordinate or factor
/// intensity, an invalid person template, or a world invariant
/// violation surfaced while adding factors, persons, or cities.
pub fn to_world(payload: &WorldPayload) -> Result<WorldBuild, SnapshotError> {
    let factors = payload
        .factor_definitions
        .iter()
        .map(|record| FactorDefinition::new(record.name.clone(), record.polarity, record.transform))
        .collect();
    let mut world = World::new(factors);

    let collections = build_person_collections(&mut world, &payload.person_collections)?;

    for record in &payload.cities {
        place_city(&mut world, record, &collections)?;
    }

    let events = payload
        .events
        .iter()
        .map(|record| Event::restore(record.name.clone(), record.trigger, record.effects.clone(), record.completed))
        .collect();

    Ok(WorldBuild { world, events })
}

fn build_person_collections(
    world: &mut World,
    specs: &[PersonCollectionSpec],
) -> Result<BTreeMap<String, Vec<migrasim_types::PersonId>>, SnapshotError> {
    let mut collections = BTreeMap::new();
    for collection in specs {
        let mut ids = Vec::new();
        for spec in &collection.persons {
            for person in materialize(spec)? {
                ids.push(world.add_person(person)?);
            }
        }
        collections.insert(collection.name.clone(), ids);
    }
    Ok(collections)
}

fn place_city(
    world: &mut World,
    record: &CityRecord,
    collections: &BTreeMap<String, Vec<migrasim_types::PersonId>>,
) -> Result<(), SnapshotError> {
    let coordinate = Coordinate::new(record.latitude, record.longitude)?;
    let mut intensities = BTreeMap::new();
    for (factor, value) in &record.factor_intensities {
        let unit = UnitValue::new(*value).map_err(|_| SnapshotError::InvalidFactorIntensity {
            factor: factor.raw(),
            value: *value,
        })?;
        intensities.insert(*factor, unit);
    }
    let city = City::new(record.name.clone(), coordinate, record.capacity, intensities);
    let city_id = world.add_city(city)?;

    for collection_name in &record.population_refs {
        let ids = collections
            .get(collection_name)
            .ok_or_else(|| SnapshotError::UnknownPersonCollection(collection_name.clone()))?;
        for person_id in ids {
            world.place_person(*person_id, city_id)?;
        }
    }
    Ok(())
}

/// Produce the one or more persons a spec describes.
fn materialize(spec: &PersonSpec) -> Result<Vec<Person>, SnapshotError> {
    match spec {
        PersonSpec::Individual { template, seed } => {
            let mut rng = person_rng(*seed, 0);
            Ok(vec![build_person(template, &mut rng)?])
        }
        PersonSpec::Repeated { count, template, seed } | PersonSpec::Generator { count, template, seed } => {
            (0..*count)
                .map(|index| {
                    let mut rng = person_rng(*seed, index);
                    build_person(template, &mut rng)
                })
                .collect()
        }
    }
}

fn evaluate(spec: &LazyValueSpec, field: &'static str, rng: &mut dyn RngCore) -> Result<UnitValue, SnapshotError> {
    let raw = spec.evaluate(rng);
    if !raw.is_finite() {
        return Err(SnapshotError::NonFiniteGeneratedValue { field });
    }
    Ok(UnitValue::saturating(raw))
}

fn build_person(template: &PersonTemplate, rng: &mut dyn RngCore) -> Result<Person, SnapshotError> {
    let mut sensitivities = BTreeMap::new();
    for (factor, spec) in &template.sensitivities {
        sensitivities.insert(*factor, evaluate(spec, "sensitivities", rng)?);
    }
    let moving_willingness = evaluate(&template.moving_willingness, "moving_willingness", rng)?;
    let retention_rate = evaluate(&template.retention_rate, "retention_rate", rng)?;
    let core = PersonCore::new(sensitivities, moving_willingness, retention_rate, template.tags.clone())?;

    match &template.variant {
        PersonVariantTemplate::Base => Ok(Person::Base(BasePerson::new(core))),
        PersonVariantTemplate::Standard {
            sensitivity_scaling,
            attraction_threshold,
            min_acceptable_attraction,
        } => {
            let sensitivity_scaling = evaluate(sensitivity_scaling, "sensitivity_scaling", rng)?;
            let attraction_threshold = evaluate(attraction_threshold, "attraction_threshold", rng)?;
            let min_acceptable_attraction = evaluate(min_acceptable_attraction, "min_acceptable_attraction", rng)?;
            Ok(Person::Standard(StandardPerson::new(
                core,
                sensitivity_scaling,
                attraction_threshold,
                min_acceptable_attraction,
            )))
        }
    }
}

/// Fully materialize a live world (and its events) into a snapshot's
/// world payload. Every person becomes an individual, `Fixed`-valued
/// spec -- there is no way to recover a generative rule from concrete
/// state -- grouped into one collection per city plus one for persons
/// with no current city.
#[must_use]
pub fn to_snapshot_payload(world: &World, events: &[Event]) -> WorldPayload {
    let factor_definitions = world
        .factors()
        .iter()
        .map(|factor| FactorDefinitionRecord {
            name: factor.name().to_owned(),
            polarity: factor.polarity(),
            transform: factor.transform(),
        })
        .collect();

    let mut by_city: BTreeMap<Option<CityId>, Vec<PersonSpec>> = BTreeMap::new();
    for (index, person) in world.persons().iter().enumerate() {
        let seed = u64::from(u32::try_from(index).unwrap_or(u32::MAX));
        let spec = PersonSpec::Individual {
            template: person_to_template(person),
            seed,
        };
        by_city.entry(person.current_city()).or_default().push(spec);
    }

    let mut person_collections = Vec::new();
    let mut collection_name_for = BTreeMap::new();
    for (city, specs) in by_city {
        let name = match city {
            Some(city_id) => format!("city-{}-residents", city_id.index()),
            None => "unplaced".to_owned(),
        };
        collection_name_for.insert(city, name.clone());
        person_collections.push(PersonCollectionSpec { name, persons: specs });
    }

    let cities = world
        .cities()
        .iter()
        .enumerate()
        .map(|(index, city)| {
            let city_id = CityId::from_index(u32::try_from(index).unwrap_or(u32::MAX));
            let population_refs = collection_name_for
                .get(&Some(city_id))
                .cloned()
                .into_iter()
                .collect();
            CityRecord {
                name: city.name().to_owned(),
                latitude: city.coordinate().latitude(),
                longitude: city.coordinate().longitude(),
                area_km2: None,
                capacity: city.capacity(),
                factor_intensities: city.factor_intensities().iter().map(|(k, v)| (*k, v.get())).collect(),
                population_refs,
            }
        })
        .collect();

    let events = events
        .iter()
        .map(|event| EventRecord {
            name: event.name().to_owned(),
            trigger: event.trigger(),
            effects: event.effects().to_vec(),
            completed: event.is_completed(),
        })
        .collect();

    WorldPayload {
        factor_definitions,
        person_collections,
        cities,
        events,
    }
}

fn person_to_template(person: &Person) -> PersonTemplate {
    let core = person.core();
    let sensitivities = core
        .sensitivities()
        .iter()
        .map(|(factor, value)| (*factor, LazyValueSpec::Fixed(value.get())))
        .collect();
    let variant = match person {
        Person::Base(_) => PersonVariantTemplate::Base,
        Person::Standard(standard) => PersonVariantTemplate::Standard {
            sensitivity_scaling: LazyValueSpec::Fixed(standard.sensitivity_scaling().get()),
            attraction_threshold: LazyValueSpec::Fixed(standard.attraction_threshold().get()),
            min_acceptable_attraction: LazyValueSpec::Fixed(standard.min_acceptable_attraction().get()),
        },
    };
    PersonTemplate {
        variant,
        sensitivities,
        moving_willingness: LazyValueSpec::Fixed(core.moving_willingness().get()),
        retention_rate: LazyValueSpec::Fixed(core.retention_rate().get()),
        tags: core.tags().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap as Map;

    use migrasim_types::{ApplicationType, FactorId, Polarity, Transform};

    use super::*;

    fn sample_payload() -> WorldPayload {
        let factor_definitions = vec![FactorDefinitionRecord {
            name: "jobs".to_owned(),
            polarity: Polarity::Positive,
            transform: Transform::Linear,
        }];
        let template = PersonTemplate {
            variant: PersonVariantTemplate::Base,
            sensitivities: Map::from([(FactorId::from_index(0), LazyValueSpec::Fixed(0.6))]),
            moving_willingness: LazyValueSpec::Fixed(0.9),
            retention_rate: LazyValueSpec::Fixed(0.1),
            tags: vec!["settler".to_owned()],
        };
        let person_collections = vec![PersonCollectionSpec {
            name: "founders".to_owned(),
            persons: vec![PersonSpec::Individual { template, seed: 1 }],
        }];
        let cities = vec![CityRecord {
            name: "Springfield".to_owned(),
            latitude: 10.0,
            longitude: 10.0,
            area_km2: Some(80.0),
            capacity: Some(10),
            factor_intensities: Map::from([(FactorId::from_index(0), 0.4)]),
            population_refs: vec!["founders".to_owned()],
        }];
        WorldPayload {
            factor_definitions,
            person_collections,
            cities,
            events: vec![EventRecord {
                name: "kickoff".to_owned(),
                trigger: migrasim_events::Trigger::Step(0),
                effects: vec![migrasim_events::Effect::FactorChange {
                    factor: FactorId::from_index(0),
                    value_producer: migrasim_events::ValueProducer::Immediate(UnitValue::ONE),
                    application_type: ApplicationType::Absolute,
                    duration: None,
                    city_filter: None,
                }],
                completed: true,
            }],
        }
    }

    #[test]
    fn to_world_places_referenced_persons() {
        let payload = sample_payload();
        let build = to_world(&payload).expect("valid payload");
        assert_eq!(build.world.total_population(), 1);
        assert_eq!(build.world.unplaced_person_count(), 0);
        assert_eq!(build.events.len(), 1);
        assert!(build.events.first().is_some_and(Event::is_completed));
    }

    #[test]
    fn to_world_rejects_unknown_collection_reference() {
        let mut payload = sample_payload();
        if let Some(city) = payload.cities.first_mut() {
            city.population_refs = vec!["ghosts".to_owned()];
        }
        assert!(to_world(&payload).is_err());
    }

    #[test]
    fn round_trip_preserves_population_and_factor_count() {
        let payload = sample_payload();
        let build = to_world(&payload).expect("valid payload");
        let restored = to_snapshot_payload(&build.world, &build.events);

        assert_eq!(restored.factor_definitions.len(), payload.factor_definitions.len());
        assert_eq!(restored.cities.len(), payload.cities.len());
        let total_restored_persons: usize = restored.person_collections.iter().map(|c| c.persons.len()).sum();
        assert_eq!(total_restored_persons, 1);
        assert_eq!(restored.events.len(), 1);
        assert!(restored.events.first().is_some_and(|e| e.completed));
    }

    #[test]
    fn unplaced_persons_land_in_their_own_collection() {
        let mut payload = sample_payload();
        if let Some(city) = payload.cities.first_mut() {
            city.population_refs.clear();
        }
        let build = to_world(&payload).expect("valid payload");
        assert_eq!(build.world.unplaced_person_count(), 1);

        let restored = to_snapshot_payload(&build.world, &build.events);
        assert!(restored.person_collections.iter().any(|c| c.name == "unplaced"));
    }
}
