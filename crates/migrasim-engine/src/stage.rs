//! The `Stage` trait and the three built-in pipeline stages (§4.1,
//! §4.4, §4.4′, §4.5): decision, execution, and event application.

use std::collections::BTreeMap;
use std::sync::Arc;

use migrasim_events::Event;
use migrasim_kernel::{calculate_all_migration_flows, sub_seed, MigrationCalculator};
use migrasim_types::CityId;
use migrasim_world::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::error::StageError;

/// One ordered step of the per-step pipeline (§4.1 "Per-step
/// protocol").
pub trait Stage: Send + Sync {
    /// A short, stable name used in `StageComplete` notifications and
    /// logging.
    fn name(&self) -> &'static str;

    /// Whether this stage should run at all this step. The three
    /// built-in stages always return `true`; the hook exists for
    /// custom stages that only apply conditionally.
    fn should_execute(&self, context: &SimulationContext) -> bool;

    /// Run this stage against `world`, reading and writing
    /// [`SimulationContext`] as its contract requires.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] for a failure this stage's own
    /// local-recovery policy does not cover (§7); the engine treats
    /// this as `StoppedReason::StageFailed` and halts the run.
    fn execute(&mut self, world: &mut World, context: &mut SimulationContext) -> Result<(), StageError>;
}

/// Computes every placed person's migration decision for the step,
/// in parallel over people (§4.4, §5).
pub struct DecisionStage {
    calculator: Arc<dyn MigrationCalculator + Sync>,
    master_seed: u64,
}

impl DecisionStage {
    /// Construct a decision stage against the given calculator and
    /// master seed (§4.4 "Determinism").
    #[must_use]
    pub const fn new(calculator: Arc<dyn MigrationCalculator + Sync>, master_seed: u64) -> Self {
        Self { calculator, master_seed }
    }
}

impl Stage for DecisionStage {
    fn name(&self) -> &'static str {
        "decision"
    }

    fn should_execute(&self, _context: &SimulationContext) -> bool {
        true
    }

    fn execute(&mut self, world: &mut World, context: &mut SimulationContext) -> Result<(), StageError> {
        // `DecisionError` is a local-recovery kind (§7 point 3) at
        // person granularity: a bad computation for one person is
        // treated as that person staying, and every other person's
        // flow computed this step is still applied.
        let (flows, errors) = calculate_all_migration_flows(world, &*self.calculator, self.master_seed);
        for cause in errors {
            context.record_soft_error(format!("decision stage treated a person as staying: {cause}"));
        }
        context.set_pending_flows(flows);
        Ok(())
    }
}

/// Applies `DecisionStage`'s pending flows to `world`, moving each
/// person and tallying the step-wide aggregates (§4.4′).
pub struct ExecutionStage {
    enforce_capacity: bool,
}

impl ExecutionStage {
    /// Construct an execution stage with the given capacity policy:
    /// `false` is the default soft-capacity policy (moves always
    /// succeed), `true` rejects moves into a destination already at
    /// capacity.
    #[must_use]
    pub const fn new(enforce_capacity: bool) -> Self {
        Self { enforce_capacity }
    }
}

impl Stage for ExecutionStage {
    fn name(&self) -> &'static str {
        "execution"
    }

    fn should_execute(&self, _context: &SimulationContext) -> bool {
        true
    }

    fn execute(&mut self, world: &mut World, context: &mut SimulationContext) -> Result<(), StageError> {
        let flows = context.take_pending_flows();
        let mut population_change: u64 = 0;
        let mut city_deltas: BTreeMap<CityId, i64> = BTreeMap::new();

        for flow in &flows {
            match world.try_move_person(flow.person(), flow.destination(), self.enforce_capacity) {
                Ok(true) => {
                    population_change = population_change.saturating_add(1);
                    let origin_delta = city_deltas.entry(flow.origin()).or_insert(0_i64);
                    *origin_delta = origin_delta.saturating_sub(1);
                    let destination_delta = city_deltas.entry(flow.destination()).or_insert(0_i64);
                    *destination_delta = destination_delta.saturating_add(1);
                }
                Ok(false) => {
                    // Hard capacity enforcement rejected the move; not
                    // an error, just an uncounted rejection (§4.4′).
                }
                Err(cause) => {
                    // `ExecutionError` is a local-recovery kind (§7 point
                    // 4): skip this flow, leave the counters untouched,
                    // keep going.
                    context.record_soft_error(format!("execution stage skipped a flow: {cause}"));
                }
            }
        }

        let max_city_population_change = city_deltas.values().map(|delta| delta.unsigned_abs()).max().unwrap_or(0);
        context.set_aggregates(population_change, max_city_population_change);
        Ok(())
    }
}

/// Applies every event whose trigger fires this step to `world`
/// (§4.5).
///
/// `use_parallel_execution` only fans the "which events are due"
/// computation out over rayon; effect application itself always runs
/// sequentially in event-declaration order. Per-city partitioned
/// mutation (§9 "Event concurrency") would need `Event::fire` to
/// operate against a single `City` rather than the whole `World`, a
/// larger change to the event-effect API this stage does not make;
/// this is the safe subset of that idea achievable without it.
pub struct EventStage {
    events: Vec<Event>,
    predicates: BTreeMap<String, Box<dyn Fn(&SimulationContext) -> bool + Send + Sync>>,
    master_seed: u64,
    use_parallel_execution: bool,
}

impl EventStage {
    /// Construct an event stage over `events`, with no registered
    /// conditional-trigger predicates.
    #[must_use]
    pub fn new(events: Vec<Event>, master_seed: u64, use_parallel_execution: bool) -> Self {
        Self {
            events,
            predicates: BTreeMap::new(),
            master_seed,
            use_parallel_execution,
        }
    }

    /// Register the predicate a [`migrasim_events::Trigger::Conditional`]
    /// event named `event_name` consults. An event whose name has no
    /// registered predicate never fires its conditional trigger.
    pub fn register_predicate<F>(&mut self, event_name: String, predicate: F)
    where
        F: Fn(&SimulationContext) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(event_name, Box::new(predicate));
    }

    /// The events this stage holds, in declaration order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl Stage for EventStage {
    fn name(&self) -> &'static str {
        "event"
    }

    fn should_execute(&self, _context: &SimulationContext) -> bool {
        true
    }

    fn execute(&mut self, world: &mut World, context: &mut SimulationContext) -> Result<(), StageError> {
        let step = context.current_step();
        let predicates = &self.predicates;
        let context_ref: &SimulationContext = context;

        let due: Vec<(usize, bool)> = if self.use_parallel_execution {
            self.events
                .par_iter()
                .enumerate()
                .filter_map(|(index, event)| {
                    let predicate_holds = predicates.get(event.name()).is_some_and(|predicate| predicate(context_ref));
                    event.should_fire(step, predicate_holds).then_some((index, predicate_holds))
                })
                .collect()
        } else {
            self.events
                .iter()
                .enumerate()
                .filter_map(|(index, event)| {
                    let predicate_holds = predicates.get(event.name()).is_some_and(|predicate| predicate(context_ref));
                    event.should_fire(step, predicate_holds).then_some((index, predicate_holds))
                })
                .collect()
        };

        for (index, predicate_holds) in due {
            let step_seed = sub_seed(self.master_seed, u32::try_from(step).unwrap_or(u32::MAX));
            let event_seed = sub_seed(step_seed, u32::try_from(index).unwrap_or(u32::MAX));
            let mut rng = ChaCha8Rng::seed_from_u64(event_seed);
            let Some(event) = self.events.get_mut(index) else {
                continue;
            };
            if let Err(cause) = event.fire(world, step, predicate_holds, &mut rng) {
                let name = event.name().to_owned();
                context.record_soft_error(format!("event '{name}' skipped: {cause}"));
            }
        }
        Ok(())
    }
}
