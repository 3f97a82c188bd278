//! The migration decision calculator (§4.4): whether a person leaves
//! their current city this step, and if so, for where.

use std::sync::Arc;

use migrasim_persons::Person;
use migrasim_types::{CityId, PersonId, UnitValue};
use migrasim_world::World;
use rand::{Rng, RngCore};
use rayon::prelude::*;

use crate::attraction::AttractionCalculator;
use crate::config::StandardModelConfig;
use crate::error::DecisionError;
use crate::rng::person_rng;

/// One person's migration decision: they leave `origin` for
/// `destination` with the given drawn `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MigrationFlow {
    origin: CityId,
    destination: CityId,
    person: PersonId,
    probability: UnitValue,
}

impl MigrationFlow {
    /// The city the person is leaving.
    #[must_use]
    pub const fn origin(&self) -> CityId {
        self.origin
    }

    /// The city the person is moving to.
    #[must_use]
    pub const fn destination(&self) -> CityId {
        self.destination
    }

    /// The person making the move.
    #[must_use]
    pub const fn person(&self) -> PersonId {
        self.person
    }

    /// The migration probability that was drawn against to produce
    /// this flow, kept for observability (§4.6 notifications).
    #[must_use]
    pub const fn probability(&self) -> UnitValue {
        self.probability
    }
}

/// Decides whether one person migrates this step, and to where.
///
/// Implementations must accept an explicit RNG rather than drawing
/// from thread-local or global state, so that callers can hand each
/// person an independent, reproducible sub-stream (§4.4, §5) when
/// fanning decisions out over rayon.
pub trait MigrationCalculator: Send + Sync {
    /// Decide `person_id`'s migration this step. Returns `Ok(None)` if
    /// the person stays.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] if `person_id` does not exist in
    /// `world` or has no current city.
    fn decide_one(
        &self,
        world: &World,
        person_id: PersonId,
        rng: &mut dyn RngCore,
    ) -> Result<Option<MigrationFlow>, DecisionError>;
}

/// The standard migration calculator (§4.4, "Algorithm
/// (StandardMigrationCalculator)").
pub struct StandardMigrationCalculator {
    attraction: Arc<dyn AttractionCalculator>,
    config: StandardModelConfig,
}

impl StandardMigrationCalculator {
    /// Construct a calculator wrapping the attraction calculator whose
    /// results it compares candidates against.
    #[must_use]
    pub fn new(attraction: Arc<dyn AttractionCalculator>, config: StandardModelConfig) -> Self {
        Self { attraction, config }
    }

    /// A person's threshold pair: `(attraction_threshold,
    /// min_acceptable_attraction)`. [`migrasim_persons::BasePerson`]
    /// carries neither field, so both default to zero -- a base person
    /// accepts any candidate that merely beats the (retention-dampened)
    /// origin comparison baseline, since they have no standard-variant
    /// tuning to express a stricter floor.
    fn thresholds(person: &Person) -> (UnitValue, UnitValue) {
        match person {
            Person::Base(_) => (UnitValue::ZERO, UnitValue::ZERO),
            Person::Standard(standard) => {
                (standard.attraction_threshold(), standard.min_acceptable_attraction())
            }
        }
    }
}

impl MigrationCalculator for StandardMigrationCalculator {
    fn decide_one(
        &self,
        world: &World,
        person_id: PersonId,
        rng: &mut dyn RngCore,
    ) -> Result<Option<MigrationFlow>, DecisionError> {
        let person = world.person(person_id).ok_or(DecisionError::PersonNotFound(person_id))?;
        let origin = person.current_city().ok_or(DecisionError::NoCurrentCity(person_id))?;

        let attractions = self.attraction.calculate_for_all_cities(world, person, Some(origin))?;
        let origin_adjusted = attractions
            .get(&origin)
            .ok_or(DecisionError::CityNotFound(origin))?
            .adjusted_attraction();

        // Step 1: retention dampens the origin's comparison value -- it
        // does not multiply the candidate side. A person with high
        // retention and low moving willingness has their *origin*
        // attraction reduced before comparison, which, combined with the
        // moving-willingness factor in step 6, still leaves them unlikely
        // to act on the resulting delta.
        let retention_dampening = 1.0
            - (1.0 - person.core().moving_willingness().get()) * person.core().retention_rate().get();
        let origin_adjusted = UnitValue::saturating(origin_adjusted.get() * retention_dampening);

        let (attraction_threshold, min_acceptable) = Self::thresholds(person);

        // Steps 2-3: candidate filtering.
        let mut candidates: Vec<(CityId, f64)> = Vec::new();
        for (city_id, result) in &attractions {
            if *city_id == origin {
                continue;
            }
            let adjusted = result.adjusted_attraction();
            if adjusted.get() < min_acceptable.get() {
                continue;
            }
            let delta = adjusted.get() - origin_adjusted.get();
            if delta >= attraction_threshold.get() {
                candidates.push((*city_id, delta));
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        // Step 4: softmax weighting over each candidate's delta.
        let steepness = self.config.migration_probability_steepness();
        let weights: Vec<f64> = candidates
            .iter()
            .map(|(_, delta)| (steepness * delta).exp())
            .collect();
        let total_weight: f64 = weights.iter().sum();
        if !total_weight.is_finite() || total_weight <= 0.0 {
            return Err(DecisionError::NonFiniteResult {
                context: "migration candidate weighting",
                person: person_id,
            });
        }

        // Step 5: weighted sampling by cumulative-threshold subtraction,
        // the same scheme the teacher pack's deterministic RNG helper
        // uses for weighted choice rather than a distribution type.
        let mut draw = rng.random::<f64>() * total_weight;
        let mut chosen = None;
        for (candidate, weight) in candidates.iter().zip(weights.iter()) {
            chosen = Some(*candidate);
            if draw < *weight {
                break;
            }
            draw -= *weight;
        }
        let (destination, destination_delta) = match chosen {
            Some(pair) => pair,
            None => {
                return Err(DecisionError::NonFiniteResult {
                    context: "migration candidate sampling",
                    person: person_id,
                })
            }
        };

        // Step 6: migration probability, scaled by overall willingness
        // to move at all.
        let threshold = self.config.migration_probability_threshold();
        let probability = sigmoid(steepness * (destination_delta - threshold))
            * person.core().moving_willingness().get();
        if !probability.is_finite() {
            return Err(DecisionError::NonFiniteResult {
                context: "migration probability",
                person: person_id,
            });
        }
        let probability = UnitValue::saturating(probability);

        // Step 7: final coin flip against the drawn probability.
        let draw = rng.random::<f64>();
        if draw < probability.get() {
            Ok(Some(MigrationFlow {
                origin,
                destination,
                person: person_id,
                probability,
            }))
        } else {
            Ok(None)
        }
    }
}

/// Logistic function `1 / (1 + e^-x)`.
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Decide migration for every placed person in `world`, in parallel.
///
/// Each person draws from an independent [`person_rng`] sub-stream
/// derived from `master_seed` and their arena index, so the result is
/// identical regardless of how rayon schedules the underlying tasks
/// (§4.4, §5). Persons with no current city are skipped rather than
/// erroring, since the decision stage runs every step and some persons
/// may not yet be placed.
///
/// A [`DecisionError`] for one person never costs any other person
/// their decision (§7 point 3): every successfully-computed flow is
/// kept, and the failing persons are reported back separately so the
/// caller can record one soft error per failure and treat only those
/// persons as staying this step.
pub fn calculate_all_migration_flows(
    world: &World,
    calculator: &(dyn MigrationCalculator + Sync),
    master_seed: u64,
) -> (Vec<MigrationFlow>, Vec<DecisionError>) {
    let results: Vec<Result<Option<MigrationFlow>, DecisionError>> = world
        .persons()
        .par_iter()
        .enumerate()
        .filter(|(_, person)| person.current_city().is_some())
        .map(|(index, _)| {
            let person_id = PersonId::try_from(index).map_err(|_| DecisionError::ArenaIndexOverflow)?;
            let mut rng = person_rng(master_seed, person_id.raw());
            calculator.decide_one(world, person_id, &mut rng)
        })
        .collect();

    let mut flows = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(Some(flow)) => flows.push(flow),
            Ok(None) => {}
            Err(error) => errors.push(error),
        }
    }
    (flows, errors)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use migrasim_persons::{BasePerson, PersonCore, StandardPerson};
    use migrasim_types::{Coordinate, FactorId, Polarity, Transform};
    use migrasim_world::{City, FactorDefinition, HaversineCalculator};

    use super::*;
    use crate::attraction::StandardAttractionCalculator;

    fn gradient_world() -> (World, CityId, CityId, CityId) {
        let mut world = World::new(vec![FactorDefinition::new(
            "quality".to_owned(),
            Polarity::Positive,
            Transform::Linear,
        )]);
        let coord = Coordinate::new(0.0, 0.0).expect("valid");

        let mut low = BTreeMap::new();
        low.insert(FactorId::from_index(0), UnitValue::saturating(0.1));
        let mut mid = BTreeMap::new();
        mid.insert(FactorId::from_index(0), UnitValue::saturating(0.5));
        let mut high = BTreeMap::new();
        high.insert(FactorId::from_index(0), UnitValue::saturating(0.95));

        let a = world
            .add_city(City::new("A".to_owned(), coord, None, low))
            .expect("valid city");
        let b = world
            .add_city(City::new("B".to_owned(), coord, None, mid))
            .expect("valid city");
        let c = world
            .add_city(City::new("C".to_owned(), coord, None, high))
            .expect("valid city");
        (world, a, b, c)
    }

    fn eager_base_person(world: &mut World, home: CityId) -> PersonId {
        let mut sens = BTreeMap::new();
        sens.insert(FactorId::from_index(0), UnitValue::ONE);
        let core = PersonCore::new(sens, UnitValue::ONE, UnitValue::ZERO, vec!["mover".to_owned()])
            .expect("valid core");
        let id = world.add_person(Person::Base(BasePerson::new(core))).expect("valid person");
        world.place_person(id, home).expect("room available");
        id
    }

    fn calculator() -> StandardMigrationCalculator {
        let attraction = Arc::new(StandardAttractionCalculator::new(
            StandardModelConfig::default(),
            Arc::new(HaversineCalculator),
        ));
        StandardMigrationCalculator::new(attraction, StandardModelConfig::default())
    }

    #[test]
    fn eager_low_attraction_person_migrates_toward_better_city() {
        let (mut world, a, _b, _c) = gradient_world();
        let person = eager_base_person(&mut world, a);
        let calc = calculator();
        let mut rng = person_rng(1, person.raw());

        let flow = calc
            .decide_one(&world, person, &mut rng)
            .expect("ok")
            .expect("eager person with a much better alternative should migrate");
        assert_eq!(flow.origin(), a);
        assert_ne!(flow.destination(), a);
    }

    #[test]
    fn fully_retained_person_never_migrates() {
        let (mut world, a, _b, _c) = gradient_world();
        let mut sens = BTreeMap::new();
        sens.insert(FactorId::from_index(0), UnitValue::ONE);
        let core = PersonCore::new(sens, UnitValue::ZERO, UnitValue::ONE, vec!["rooted".to_owned()])
            .expect("valid core");
        let person = world.add_person(Person::Base(BasePerson::new(core))).expect("valid person");
        world.place_person(person, a).expect("room available");
        let calc = calculator();
        let mut rng = person_rng(1, person.raw());

        let flow = calc.decide_one(&world, person, &mut rng).expect("ok");
        assert!(flow.is_none(), "zero moving willingness must never migrate");
    }

    #[test]
    fn standard_person_respects_min_acceptable_attraction_floor() {
        let (mut world, a, _b, c) = gradient_world();
        let mut sens = BTreeMap::new();
        sens.insert(FactorId::from_index(0), UnitValue::ONE);
        let core = PersonCore::new(sens, UnitValue::ONE, UnitValue::ZERO, vec!["picky".to_owned()])
            .expect("valid core");
        let person = world
            .add_person(Person::Standard(StandardPerson::new(
                core,
                UnitValue::ONE,
                UnitValue::ZERO,
                UnitValue::saturating(0.99),
            )))
            .expect("valid person");
        world.place_person(person, a).expect("room available");
        let calc = calculator();
        let mut rng = person_rng(1, person.raw());

        let flow = calc.decide_one(&world, person, &mut rng).expect("ok");
        assert!(
            flow.is_none() || flow.expect("checked").destination() != c,
            "an unreachable floor should leave no viable candidate"
        );
    }

    #[test]
    fn decision_is_deterministic_for_same_seed_and_index() {
        let (mut world, a, _b, _c) = gradient_world();
        let person = eager_base_person(&mut world, a);
        let calc = calculator();

        let mut rng_one = person_rng(7, person.raw());
        let mut rng_two = person_rng(7, person.raw());
        let first = calc.decide_one(&world, person, &mut rng_one).expect("ok");
        let second = calc.decide_one(&world, person, &mut rng_two).expect("ok");
        assert_eq!(first, second);
    }

    #[test]
    fn calculate_all_migration_flows_skips_unplaced_persons() {
        let (mut world, a, _b, _c) = gradient_world();
        let placed = eager_base_person(&mut world, a);
        let mut sens = BTreeMap::new();
        sens.insert(FactorId::from_index(0), UnitValue::ONE);
        let core = PersonCore::new(sens, UnitValue::ONE, UnitValue::ZERO, vec!["unplaced".to_owned()])
            .expect("valid core");
        world.add_person(Person::Base(BasePerson::new(core))).expect("valid person");

        let calc = calculator();
        let (flows, errors) = calculate_all_migration_flows(&world, &calc, 42);
        assert!(errors.is_empty());
        assert!(flows.iter().all(|f| f.person() == placed));
    }

    #[test]
    fn calculate_all_migration_flows_is_order_independent_of_scheduling() {
        let (mut world, a, _b, _c) = gradient_world();
        for _ in 0..8 {
            eager_base_person(&mut world, a);
        }
        let calc = calculator();

        let (first, first_errors) = calculate_all_migration_flows(&world, &calc, 123);
        let (second, second_errors) = calculate_all_migration_flows(&world, &calc, 123);
        assert_eq!(first, second);
        assert_eq!(first_errors, second_errors);
    }

    struct FlakyCalculator {
        fail_person: PersonId,
    }

    impl MigrationCalculator for FlakyCalculator {
        fn decide_one(
            &self,
            world: &World,
            person_id: PersonId,
            _rng: &mut dyn RngCore,
        ) -> Result<Option<MigrationFlow>, DecisionError> {
            if person_id == self.fail_person {
                return Err(DecisionError::NonFiniteResult {
                    context: "test fixture",
                    person: person_id,
                });
            }
            let origin = world
                .person(person_id)
                .and_then(Person::current_city)
                .ok_or(DecisionError::NoCurrentCity(person_id))?;
            Ok(Some(MigrationFlow {
                origin,
                destination: origin,
                person: person_id,
                probability: UnitValue::ZERO,
            }))
        }
    }

    #[test]
    fn one_persons_decision_error_does_not_discard_everyone_elses_flow() {
        let (mut world, a, b, _c) = gradient_world();
        let ok_person = eager_base_person(&mut world, a);
        let failing_person = eager_base_person(&mut world, b);

        let calc = FlakyCalculator {
            fail_person: failing_person,
        };
        let (flows, errors) = calculate_all_migration_flows(&world, &calc, 1);

        assert_eq!(errors.len(), 1, "only the failing person's error should be reported");
        assert!(matches!(
            &errors[0],
            DecisionError::NonFiniteResult { person, .. } if *person == failing_person
        ));
        assert_eq!(flows.len(), 1, "the other person's valid flow must survive");
        assert_eq!(flows[0].person(), ok_person);
    }
}
