//! Cities: the nodes persons migrate between.

use std::collections::{BTreeMap, BTreeSet};

use migrasim_types::{CityId, Coordinate, FactorId, PersonId, UnitValue};

use crate::error::WorldError;

/// A city: a location, an optional capacity, and a resident set, plus
/// the factor intensities that drive attraction toward it.
#[derive(Debug, Clone)]
pub struct City {
    name: String,
    coordinate: Coordinate,
    capacity: Option<u32>,
    factor_intensities: BTreeMap<FactorId, UnitValue>,
    residents: BTreeSet<PersonId>,
}

impl City {
    /// Construct a city. The caller (ordinarily [`crate::world::World::add_city`])
    /// is responsible for ensuring `factor_intensities` covers every
    /// factor the world defines.
    #[must_use]
    pub const fn new(
        name: String,
        coordinate: Coordinate,
        capacity: Option<u32>,
        factor_intensities: BTreeMap<FactorId, UnitValue>,
    ) -> Self {
        Self {
            name,
            coordinate,
            capacity,
            factor_intensities,
            residents: BTreeSet::new(),
        }
    }

    /// The city's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The city's location.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The city's capacity, if bounded.
    #[must_use]
    pub const fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Current resident count.
    #[must_use]
    pub fn population(&self) -> u32 {
        u32::try_from(self.residents.len()).unwrap_or(u32::MAX)
    }

    /// Whether the city can accept another resident.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.capacity.is_none_or(|cap| self.population() < cap)
    }

    /// The intensity of a factor in this city.
    #[must_use]
    pub fn factor_intensity(&self, factor: FactorId) -> Option<UnitValue> {
        self.factor_intensities.get(&factor).copied()
    }

    /// The full factor intensity mapping.
    #[must_use]
    pub const fn factor_intensities(&self) -> &BTreeMap<FactorId, UnitValue> {
        &self.factor_intensities
    }

    /// Set (or replace) a factor's intensity, as applied by a factor
    /// change effect.
    pub fn set_factor_intensity(&mut self, factor: FactorId, value: UnitValue) {
        self.factor_intensities.insert(factor, value);
    }

    /// The set of resident person ids, in ascending id order.
    #[must_use]
    pub const fn residents(&self) -> &BTreeSet<PersonId> {
        &self.residents
    }

    /// Whether a specific person currently resides here.
    #[must_use]
    pub fn contains_resident(&self, person: PersonId) -> bool {
        self.residents.contains(&person)
    }

    /// Add a resident, checked against capacity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CityNotFound`]-free domain error
    /// [`WorldError::AlreadyResident`] is not checked here (the world
    /// enforces the single-current-city invariant); this only enforces
    /// city capacity.
    pub(crate) fn add_resident(&mut self, person: PersonId) -> Result<(), WorldError> {
        if !self.has_capacity() {
            return Err(WorldError::CityAtCapacity);
        }
        self.residents.insert(person);
        Ok(())
    }

    /// Add a resident without a capacity check, for the execution
    /// stage's default "soft capacity" policy (§4.4′): capacity shapes
    /// attraction through resistance rather than hard-blocking a move
    /// the decision stage already committed to.
    pub(crate) fn add_resident_unchecked(&mut self, person: PersonId) {
        self.residents.insert(person);
    }

    /// Remove a resident.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotResident`] if the person is not
    /// currently resident here. The caller supplies the city id for
    /// the error since `City` does not know its own id.
    pub(crate) fn remove_resident(
        &mut self,
        person: PersonId,
        city: CityId,
    ) -> Result<(), WorldError> {
        if !self.residents.remove(&person) {
            return Err(WorldError::NotResident { person, city });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_city(capacity: Option<u32>) -> City {
        let coord = Coordinate::new(10.0, 10.0).expect("valid");
        City::new("Testville".to_owned(), coord, capacity, BTreeMap::new())
    }

    #[test]
    fn new_city_has_no_residents() {
        let city = make_city(Some(2));
        assert_eq!(city.population(), 0);
        assert!(city.has_capacity());
    }

    #[test]
    fn add_and_remove_resident() {
        let mut city = make_city(Some(2));
        let p1 = PersonId::from_index(0);
        let p2 = PersonId::from_index(1);

        assert!(city.add_resident(p1).is_ok());
        assert!(city.contains_resident(p1));
        assert_eq!(city.population(), 1);

        assert!(city.add_resident(p2).is_ok());
        assert_eq!(city.population(), 2);

        assert!(city.remove_resident(p1, CityId::from_index(0)).is_ok());
        assert!(!city.contains_resident(p1));
        assert_eq!(city.population(), 1);
    }

    #[test]
    fn capacity_enforcement() {
        let mut city = make_city(Some(1));
        let p1 = PersonId::from_index(0);
        let p2 = PersonId::from_index(1);
        assert!(city.add_resident(p1).is_ok());
        assert!(city.add_resident(p2).is_err());
    }

    #[test]
    fn unbounded_capacity_always_has_room() {
        let city = make_city(None);
        assert!(city.has_capacity());
    }

    #[test]
    fn remove_absent_resident_errors() {
        let mut city = make_city(Some(5));
        let err = city.remove_resident(PersonId::from_index(7), CityId::from_index(0));
        assert!(err.is_err());
    }

    #[test]
    fn factor_intensity_defaults_to_none_then_settable() {
        let mut city = make_city(None);
        let factor = FactorId::from_index(3);
        assert_eq!(city.factor_intensity(factor), None);
        city.set_factor_intensity(factor, UnitValue::saturating(0.8));
        assert_eq!(city.factor_intensity(factor).map(UnitValue::get), Some(0.8));
    }
}
