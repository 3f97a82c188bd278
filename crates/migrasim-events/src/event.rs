//! `Event`: a named trigger/effects pair with completion and
//! transition bookkeeping (§4.5).

use std::collections::BTreeMap;

use migrasim_types::{ApplicationType, CityId, FactorId, UnitValue};
use migrasim_world::World;
use rand::RngCore;

use crate::effect::{linear_progress, logarithmic_progress, Effect, ValueProducer};
use crate::error::EventError;
use crate::trigger::{Trigger, TriggerState};

/// A scheduled mutation to city factor intensities, gated by a
/// trigger, with the bookkeeping (completion flag, transition origin
/// values) needed to apply it correctly step after step.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    trigger: Trigger,
    effects: Vec<Effect>,
    completed: bool,
    last_fired_step: Option<u64>,
    first_fired_step: Option<u64>,
    transition_origins: BTreeMap<(FactorId, CityId), UnitValue>,
}

impl Event {
    /// Construct an event. Fresh events start uncompleted and with no
    /// fire history.
    #[must_use]
    pub fn new(name: String, trigger: Trigger, effects: Vec<Effect>) -> Self {
        Self {
            name,
            trigger,
            effects,
            completed: false,
            last_fired_step: None,
            first_fired_step: None,
            transition_origins: BTreeMap::new(),
        }
    }

    /// Reconstruct an event from a snapshot record (§6), which
    /// persists only the completion flag and not the transition-origin
    /// or fire-history bookkeeping: a restored mid-transition event
    /// re-captures its origin values the next time it fires, treating
    /// the restored step as a fresh start for any transition in
    /// progress.
    #[must_use]
    pub fn restore(name: String, trigger: Trigger, effects: Vec<Effect>, completed: bool) -> Self {
        Self {
            completed,
            ..Self::new(name, trigger, effects)
        }
    }

    /// The event's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The trigger gating this event's effects.
    #[must_use]
    pub const fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// The effects this event applies when its trigger fires.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Whether a one-shot [`Trigger::Step`] has already fired.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether this event's trigger fires at `step`, given whether an
    /// externally-evaluated predicate currently holds (ignored for
    /// every trigger but [`Trigger::Conditional`]).
    ///
    /// A one-shot [`Trigger::Step`] that owns a transition effect is a
    /// special case: the trigger itself only names the step the
    /// transition *starts* at, but the event must keep firing every
    /// step after that until the transition's `duration` has fully
    /// elapsed, so the ramp actually reaches its target.
    #[must_use]
    pub fn should_fire(&self, step: u64, predicate_holds: bool) -> bool {
        if self.completed {
            return false;
        }
        if let Trigger::Step(target) = self.trigger {
            return match self.first_fired_step {
                None => step == target,
                Some(first) => match self.transition_duration() {
                    Some(duration) => step > first && step <= first.saturating_add(u64::from(duration)),
                    None => false,
                },
            };
        }
        let state = TriggerState {
            last_fired_step: self.last_fired_step,
            predicate_holds,
        };
        self.trigger.should_fire(step, &state)
    }

    /// Apply this event's effects to `world` at `step`, if its trigger
    /// fires. Returns whether it fired.
    ///
    /// Every `FactorChange` target is resolved to a concrete
    /// `(city, factor, value)` triple against an unmodified `world`
    /// before anything is written, so a `Composite` effect either
    /// fully applies or leaves `world` untouched on error (§4.5
    /// "transactional within a single event").
    ///
    /// # Errors
    ///
    /// Returns the first [`EventError`] encountered while resolving
    /// targets; `world` is left unmodified in that case, and the
    /// caller (the event stage) is expected to skip this event for the
    /// step rather than abort the run.
    pub fn fire(
        &mut self,
        world: &mut World,
        step: u64,
        predicate_holds: bool,
        rng: &mut dyn RngCore,
    ) -> Result<bool, EventError> {
        if !self.should_fire(step, predicate_holds) {
            return Ok(false);
        }

        let first_fired_step = *self.first_fired_step.get_or_insert(step);
        if self.last_fired_step.is_none() {
            self.capture_transition_origins(world);
        }

        let mut changes = Vec::new();
        for effect in &self.effects {
            resolve_effect(effect, world, step, first_fired_step, &self.transition_origins, rng, &mut changes)?;
        }

        for (city_id, factor_id, value) in changes {
            if let Some(city) = world.city_mut(city_id) {
                city.set_factor_intensity(factor_id, value);
            }
        }

        self.last_fired_step = Some(step);
        if matches!(self.trigger, Trigger::Step(_)) {
            let elapsed = step.saturating_sub(first_fired_step);
            let still_transitioning = self.transition_duration().is_some_and(|duration| elapsed < u64::from(duration));
            if !still_transitioning {
                self.completed = true;
            }
        }
        Ok(true)
    }

    /// The longest transition window any of this event's effects runs
    /// over, if any effect is a `LinearTransition`/`LogarithmicTransition`.
    fn transition_duration(&self) -> Option<u32> {
        self.effects.iter().filter_map(Effect::transition_duration).max()
    }

    /// Record every transitioning `(factor, city)` pair's current
    /// intensity as the transition's starting point, the first time
    /// this event ever fires. Later fires read from this map instead
    /// of the world's live value, so a multi-step transition ramps
    /// from a fixed origin rather than chasing whatever the previous
    /// step just wrote.
    fn capture_transition_origins(&mut self, world: &World) {
        let mut factors = Vec::new();
        for effect in &self.effects {
            effect.collect_transition_factors(&mut factors);
        }
        if factors.is_empty() {
            return;
        }
        for (index, city) in world.cities().iter().enumerate() {
            let Ok(city_id) = CityId::try_from(index) else {
                continue;
            };
            for factor in &factors {
                if let Some(intensity) = city.factor_intensity(*factor) {
                    self.transition_origins.entry((*factor, city_id)).or_insert(intensity);
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_effect(
    effect: &Effect,
    world: &World,
    step: u64,
    first_fired_step: u64,
    origins: &BTreeMap<(FactorId, CityId), UnitValue>,
    rng: &mut dyn RngCore,
    out: &mut Vec<(CityId, FactorId, UnitValue)>,
) -> Result<(), EventError> {
    match effect {
        Effect::Composite(children) => {
            for child in children {
                resolve_effect(child, world, step, first_fired_step, origins, rng, out)?;
            }
            Ok(())
        }
        Effect::FactorChange {
            factor,
            value_producer,
            application_type,
            duration,
            city_filter,
        } => {
            if world.factor(*factor).is_none() {
                return Err(EventError::FactorNotFound(*factor));
            }

            let targets = resolve_targets(world, city_filter)?;
            let elapsed = u32::try_from(step.saturating_sub(first_fired_step)).unwrap_or(u32::MAX);

            for city_id in targets {
                let city = world.city(city_id).ok_or(EventError::CityNotFound(city_id))?;
                let current = city.factor_intensity(*factor).ok_or(EventError::FactorNotFound(*factor))?;
                let produced = value_producer.produce(rng);

                let new_value = match application_type {
                    ApplicationType::Absolute => produced,
                    ApplicationType::Delta => UnitValue::saturating(current.get() + produced.get()),
                    ApplicationType::Multiply => current.mul(produced),
                    ApplicationType::LinearTransition => {
                        let origin = origins.get(&(*factor, city_id)).copied().unwrap_or(current);
                        let duration = duration.ok_or(EventError::InvalidDuration)?;
                        let progress = linear_progress(elapsed, duration)?;
                        origin.lerp(produced, progress)
                    }
                    ApplicationType::LogarithmicTransition => {
                        let origin = origins.get(&(*factor, city_id)).copied().unwrap_or(current);
                        let duration = duration.ok_or(EventError::InvalidDuration)?;
                        let progress = logarithmic_progress(elapsed, duration)?;
                        origin.lerp(produced, progress)
                    }
                };
                out.push((city_id, *factor, new_value));
            }
            Ok(())
        }
    }
}

fn resolve_targets(world: &World, city_filter: &Option<Vec<CityId>>) -> Result<Vec<CityId>, EventError> {
    match city_filter {
        Some(cities) => {
            for city_id in cities {
                if world.city(*city_id).is_none() {
                    return Err(EventError::CityNotFound(*city_id));
                }
            }
            Ok(cities.clone())
        }
        None => world
            .cities()
            .iter()
            .enumerate()
            .map(|(index, _)| CityId::try_from(index).map_err(|_| EventError::CityNotFound(CityId::from_index(0))))
            .collect(),
    }
}
