//! The `World` aggregate: factor definitions, cities, and persons,
//! plus the invariants that tie them together.

use migrasim_persons::{Person, PersonCore, PersonKind};
use migrasim_types::{CityId, FactorId, PersonId, UnitValue};

use crate::city::City;
use crate::error::WorldError;
use crate::factor::FactorDefinition;

/// Neutral sensitivity filled in for a person who did not specify a
/// weight for some factor the world defines (data model invariant 2).
fn neutral_sensitivity() -> UnitValue {
    UnitValue::saturating(0.5)
}

/// The simulation's world: every factor, city, and person, plus the
/// bookkeeping that keeps a person's residency consistent with exactly
/// one city at a time.
///
/// `World` owns `persons` directly (rather than persons owning a
/// reference back to their world) so that placement and movement are
/// expressed as ordinary `&mut self` methods with no interior
/// mutability or reference counting anywhere in the data model.
#[derive(Debug, Clone, Default)]
pub struct World {
    factors: Vec<FactorDefinition>,
    cities: Vec<City>,
    persons: Vec<Person>,
    expected_variant: Option<PersonKind>,
}

impl World {
    /// Construct an empty world with the given factor definitions.
    #[must_use]
    pub fn new(factors: Vec<FactorDefinition>) -> Self {
        Self {
            factors,
            cities: Vec::new(),
            persons: Vec::new(),
            expected_variant: None,
        }
    }

    /// All factor definitions, indexed by [`FactorId`].
    #[must_use]
    pub fn factors(&self) -> &[FactorDefinition] {
        &self.factors
    }

    /// A single factor definition.
    #[must_use]
    pub fn factor(&self, id: FactorId) -> Option<&FactorDefinition> {
        self.factors.get(id.index())
    }

    /// Add a city.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownFactor`] if the city's intensity
    /// map references a factor this world does not define, or
    /// [`WorldError::MissingFactorIntensity`] if it omits one the world
    /// does define (data model invariant 1: every city must carry an
    /// intensity for every factor).
    pub fn add_city(&mut self, city: City) -> Result<CityId, WorldError> {
        for factor in city.factor_intensities().keys() {
            if self.factor(*factor).is_none() {
                return Err(WorldError::UnknownFactor(*factor));
            }
        }
        for index in 0..self.factors.len() {
            let factor = FactorId::from_index(u32::try_from(index).unwrap_or(u32::MAX));
            if city.factor_intensity(factor).is_none() {
                return Err(WorldError::MissingFactorIntensity(factor));
            }
        }
        let id = CityId::from_index(u32::try_from(self.cities.len()).unwrap_or(u32::MAX));
        self.cities.push(city);
        Ok(id)
    }

    /// All cities, indexed by [`CityId`].
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// A single city.
    #[must_use]
    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id.index())
    }

    /// Mutable access to a single city, used by the event engine to
    /// apply factor changes and by placement/movement to update
    /// resident sets.
    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(id.index())
    }

    /// Add a person to the world without placing them in any city.
    ///
    /// Fills any sensitivity gaps against the world's factor
    /// definitions with a neutral default (data model invariant 2),
    /// and enforces that every person in a world shares the same
    /// concrete variant (data model invariant 3).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MixedPersonVariant`] if this person's
    /// variant differs from a previously added person's.
    pub fn add_person(&mut self, mut person: Person) -> Result<PersonId, WorldError> {
        match self.expected_variant {
            Some(expected) if expected != person.kind() => {
                return Err(WorldError::MixedPersonVariant);
            }
            Some(_) => {}
            None => self.expected_variant = Some(person.kind()),
        }

        for index in 0..self.factors.len() {
            let factor = FactorId::from_index(u32::try_from(index).unwrap_or(u32::MAX));
            fill_missing_sensitivity(person.core_mut(), factor);
        }

        let id = PersonId::from_index(u32::try_from(self.persons.len()).unwrap_or(u32::MAX));
        self.persons.push(person);
        Ok(id)
    }

    /// All persons, indexed by [`PersonId`].
    #[must_use]
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// A single person.
    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(id.index())
    }

    /// Mutable access to a single person.
    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.persons.get_mut(id.index())
    }

    /// Place a person who currently has no city into one, for initial
    /// world construction (not a migration move).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PersonNotFound`] or
    /// [`WorldError::CityNotFound`] for unknown ids,
    /// [`WorldError::AlreadyResident`] if the person already has a
    /// current city, or any error from the target city's capacity
    /// check.
    pub fn place_person(&mut self, person_id: PersonId, city_id: CityId) -> Result<(), WorldError> {
        let already_resident = self
            .persons
            .get(person_id.index())
            .ok_or(WorldError::PersonNotFound(person_id))?
            .current_city()
            .is_some();
        if already_resident {
            return Err(WorldError::AlreadyResident { person: person_id });
        }

        let city = self
            .cities
            .get_mut(city_id.index())
            .ok_or(WorldError::CityNotFound(city_id))?;
        city.add_resident(person_id)?;

        let person = self
            .persons
            .get_mut(person_id.index())
            .ok_or(WorldError::PersonNotFound(person_id))?;
        person.core_mut().set_current_city(Some(city_id));
        Ok(())
    }

    /// Move a person from their current city to a new one atomically:
    /// if the new city lacks capacity, the person remains in their
    /// original city. Used by the execution stage to apply a migration
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PersonNotFound`] / [`WorldError::CityNotFound`]
    /// for unknown ids, or [`WorldError::NotResident`] if the person
    /// has no current city to move from.
    pub fn move_person(&mut self, person_id: PersonId, to: CityId) -> Result<(), WorldError> {
        let from = self
            .persons
            .get(person_id.index())
            .ok_or(WorldError::PersonNotFound(person_id))?
            .current_city()
            .ok_or(WorldError::NotResident {
                person: person_id,
                city: to,
            })?;

        if self.cities.get(to.index()).is_none() {
            return Err(WorldError::CityNotFound(to));
        }
        if !self.cities.get(to.index()).is_some_and(City::has_capacity) {
            return Err(WorldError::CityAtCapacity);
        }

        if let Some(origin) = self.cities.get_mut(from.index()) {
            origin.remove_resident(person_id, from)?;
        }
        let destination = self
            .cities
            .get_mut(to.index())
            .ok_or(WorldError::CityNotFound(to))?;
        destination.add_resident(person_id)?;

        if let Some(person) = self.persons.get_mut(person_id.index()) {
            person.core_mut().set_current_city(Some(to));
        }
        Ok(())
    }

    /// Move a person from their current city to a new one, with the
    /// execution stage's capacity policy (§4.4′) as an explicit
    /// parameter rather than baked into the method: when
    /// `enforce_capacity` is `false` (the spec's default "soft
    /// capacity" policy), the move always succeeds and capacity is left
    /// to shape attraction through resistance alone. When `true` (hard
    /// capacity enforcement), a full destination rejects the move and
    /// the person stays put, returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PersonNotFound`] / [`WorldError::CityNotFound`]
    /// for unknown ids, or [`WorldError::NotResident`] if the person has
    /// no current city to move from.
    pub fn try_move_person(
        &mut self,
        person_id: PersonId,
        to: CityId,
        enforce_capacity: bool,
    ) -> Result<bool, WorldError> {
        let from = self
            .persons
            .get(person_id.index())
            .ok_or(WorldError::PersonNotFound(person_id))?
            .current_city()
            .ok_or(WorldError::NotResident {
                person: person_id,
                city: to,
            })?;

        let destination = self.cities.get(to.index()).ok_or(WorldError::CityNotFound(to))?;
        if enforce_capacity && !destination.has_capacity() {
            return Ok(false);
        }

        if let Some(origin) = self.cities.get_mut(from.index()) {
            origin.remove_resident(person_id, from)?;
        }
        let destination = self
            .cities
            .get_mut(to.index())
            .ok_or(WorldError::CityNotFound(to))?;
        destination.add_resident_unchecked(person_id);

        if let Some(person) = self.persons.get_mut(person_id.index()) {
            person.core_mut().set_current_city(Some(to));
        }
        Ok(true)
    }

    /// Total population across all cities.
    #[must_use]
    pub fn total_population(&self) -> usize {
        self.cities.iter().map(|c| c.residents().len()).sum()
    }

    /// Count of persons with no current city.
    #[must_use]
    pub fn unplaced_person_count(&self) -> usize {
        self.persons
            .iter()
            .filter(|p| p.current_city().is_none())
            .count()
    }
}

fn fill_missing_sensitivity(core: &mut PersonCore, factor: FactorId) {
    if core.sensitivity(factor).is_none() {
        core.fill_default_sensitivity(factor, neutral_sensitivity());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use migrasim_persons::BasePerson;
    use migrasim_types::{Coordinate, Polarity, Transform};

    use super::*;

    fn world_with_two_cities() -> (World, CityId, CityId) {
        let mut world = World::new(vec![FactorDefinition::new(
            "jobs".to_owned(),
            Polarity::Positive,
            Transform::Linear,
        )]);
        let mut intensities = BTreeMap::new();
        intensities.insert(FactorId::from_index(0), UnitValue::saturating(0.6));
        let coord = Coordinate::new(0.0, 0.0).expect("valid");
        let city_a = world
            .add_city(City::new("A".to_owned(), coord, Some(1), intensities.clone()))
            .expect("valid city");
        let city_b = world
            .add_city(City::new("B".to_owned(), coord, Some(1), intensities))
            .expect("valid city");
        (world, city_a, city_b)
    }

    fn base_person() -> Person {
        let core = PersonCore::new(
            BTreeMap::new(),
            UnitValue::ONE,
            UnitValue::ZERO,
            vec!["resident".to_owned()],
        )
        .expect("valid core");
        Person::Base(BasePerson::new(core))
    }

    #[test]
    fn add_city_requires_full_factor_coverage() {
        let mut world = World::new(vec![FactorDefinition::new(
            "jobs".to_owned(),
            Polarity::Positive,
            Transform::Linear,
        )]);
        let coord = Coordinate::new(0.0, 0.0).expect("valid");
        let city = City::new("Incomplete".to_owned(), coord, None, BTreeMap::new());
        assert!(world.add_city(city).is_err());
    }

    #[test]
    fn add_person_fills_missing_sensitivity() {
        let (mut world, _, _) = world_with_two_cities();
        let id = world.add_person(base_person()).expect("valid person");
        let person = world.person(id).expect("present");
        assert_eq!(
            person.core().sensitivity(FactorId::from_index(0)),
            Some(neutral_sensitivity())
        );
    }

    #[test]
    fn mixed_person_variant_rejected() {
        let (mut world, _, _) = world_with_two_cities();
        world.add_person(base_person()).expect("valid person");
        let standard = Person::Standard(migrasim_persons::StandardPerson::new(
            PersonCore::new(
                BTreeMap::new(),
                UnitValue::ONE,
                UnitValue::ZERO,
                vec!["x".to_owned()],
            )
            .expect("valid core"),
            UnitValue::ONE,
            UnitValue::ZERO,
            UnitValue::ZERO,
        ));
        assert!(world.add_person(standard).is_err());
    }

    #[test]
    fn place_and_move_person() {
        let (mut world, city_a, city_b) = world_with_two_cities();
        let person = world.add_person(base_person()).expect("valid person");
        world.place_person(person, city_a).expect("room available");
        assert_eq!(world.city(city_a).expect("present").population(), 1);

        world.move_person(person, city_b).expect("room available");
        assert_eq!(world.city(city_a).expect("present").population(), 0);
        assert_eq!(world.city(city_b).expect("present").population(), 1);
        assert_eq!(world.person(person).expect("present").current_city(), Some(city_b));
    }

    #[test]
    fn move_person_without_capacity_leaves_original_untouched() {
        let (mut world, city_a, city_b) = world_with_two_cities();
        let first = world.add_person(base_person()).expect("valid person");
        let second = world.add_person(base_person()).expect("valid person");
        world.place_person(first, city_a).expect("room available");
        world.place_person(second, city_b).expect("room available");

        assert!(world.move_person(first, city_b).is_err());
        assert_eq!(world.city(city_a).expect("present").population(), 1);
        assert_eq!(world.city(city_b).expect("present").population(), 1);
    }

    #[test]
    fn try_move_person_soft_capacity_ignores_full_destination() {
        let (mut world, city_a, city_b) = world_with_two_cities();
        let first = world.add_person(base_person()).expect("valid person");
        let second = world.add_person(base_person()).expect("valid person");
        world.place_person(first, city_a).expect("room available");
        world.place_person(second, city_b).expect("room available");

        let moved = world
            .try_move_person(first, city_b, false)
            .expect("soft move never errors on capacity");
        assert!(moved);
        assert_eq!(world.city(city_b).expect("present").population(), 2);
    }

    #[test]
    fn try_move_person_hard_capacity_rejects_full_destination() {
        let (mut world, city_a, city_b) = world_with_two_cities();
        let first = world.add_person(base_person()).expect("valid person");
        let second = world.add_person(base_person()).expect("valid person");
        world.place_person(first, city_a).expect("room available");
        world.place_person(second, city_b).expect("room available");

        let moved = world
            .try_move_person(first, city_b, true)
            .expect("hard enforcement reports rejection, not an error");
        assert!(!moved);
        assert_eq!(world.city(city_a).expect("present").population(), 1);
        assert_eq!(world.city(city_b).expect("present").population(), 1);
    }

    #[test]
    fn placing_already_resident_person_errors() {
        let (mut world, city_a, _) = world_with_two_cities();
        let person = world.add_person(base_person()).expect("valid person");
        world.place_person(person, city_a).expect("room available");
        assert!(world.place_person(person, city_a).is_err());
    }

    #[test]
    fn population_counters() {
        let (mut world, city_a, _) = world_with_two_cities();
        let person = world.add_person(base_person()).expect("valid person");
        assert_eq!(world.unplaced_person_count(), 1);
        world.place_person(person, city_a).expect("room available");
        assert_eq!(world.unplaced_person_count(), 0);
        assert_eq!(world.total_population(), 1);
    }
}
