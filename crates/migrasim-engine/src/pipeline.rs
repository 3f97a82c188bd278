//! The ordered list of stages the engine drives every step (§4.1).

use migrasim_world::World;

use crate::context::SimulationContext;
use crate::error::StageError;
use crate::stage::Stage;

/// An ordered, immutable-length list of [`Stage`]s run in sequence
/// every step.
///
/// Stage order is a construction-time decision, not a per-run one:
/// the decision stage must run before execution, which must run
/// before the next step's decision stage sees the moved population,
/// and the event stage's placement relative to those two is a model
/// choice (§4.5 "Between decision and execution -- or after execution,
/// per stage ordering"), so `Pipeline` takes whatever order the caller
/// built it with rather than imposing one.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Construct a pipeline from an ordered list of stages.
    #[must_use]
    pub const fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Whether this pipeline has no stages at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The configured stage names, in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage whose [`Stage::should_execute`] holds, in
    /// order, against `world` and `context`, invoking `on_stage_complete`
    /// after each one succeeds (§4.1 step 3).
    ///
    /// # Errors
    ///
    /// Returns the first [`StageError`] any stage raises, along with
    /// the name of the stage that raised it, and runs no further
    /// stages this step.
    pub fn run_step(
        &mut self,
        world: &mut World,
        context: &mut SimulationContext,
        mut on_stage_complete: impl FnMut(&'static str),
    ) -> Result<(), (&'static str, StageError)> {
        for stage in &mut self.stages {
            if !stage.should_execute(context) {
                continue;
            }
            let name = stage.name();
            stage.execute(world, context).map_err(|cause| (name, cause))?;
            on_stage_complete(name);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use migrasim_types::{Coordinate, FactorId, Polarity, Transform, UnitValue};
    use migrasim_world::{City, FactorDefinition};

    use super::*;
    use crate::stage::ExecutionStage;

    fn single_city_world() -> World {
        let mut world = World::new(vec![FactorDefinition::new(
            "jobs".to_owned(),
            Polarity::Positive,
            Transform::Linear,
        )]);
        let coord = Coordinate::new(0.0, 0.0).expect("valid coordinate");
        let mut intensities = BTreeMap::new();
        intensities.insert(FactorId::from_index(0), UnitValue::saturating(0.3));
        world
            .add_city(City::new("Only".to_owned(), coord, None, intensities))
            .expect("valid city");
        world
    }

    #[test]
    fn empty_pipeline_reports_is_empty() {
        let pipeline = Pipeline::new(Vec::new());
        assert!(pipeline.is_empty());
        assert!(pipeline.stage_names().is_empty());
    }

    #[test]
    fn run_step_invokes_the_callback_once_per_completed_stage() {
        let mut pipeline = Pipeline::new(vec![Box::new(ExecutionStage::new(false))]);
        let mut world = single_city_world();
        let mut context = SimulationContext::new();
        let mut completed = Vec::new();

        pipeline.run_step(&mut world, &mut context, |name| completed.push(name)).expect("ok");

        assert_eq!(completed, vec!["execution"]);
        assert_eq!(pipeline.stage_names(), vec!["execution"]);
    }
}
