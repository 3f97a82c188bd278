//! Command-line runner for the migration simulation.
//!
//! Wires together configuration loading, world construction, the
//! engine, and a logging observer, then runs to completion and prints
//! a final summary. Synchronous: the engine itself has no I/O-bound
//! work, so there is nothing for an async runtime to schedule around.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (`tracing`).
//! 2. Load `migrasim-config.yaml` if present, else engine defaults.
//! 3. Load `migrasim-scenario.yaml` if present, else the built-in demo
//!    scenario.
//! 4. Convert the scenario into a live world and its scheduled events.
//! 5. Build the decision/execution/event pipeline from the model
//!    config.
//! 6. Attach a logging observer and run the engine to completion.
//! 7. Log the final outcome and per-city population.

mod error;
mod scenario;

use std::path::Path;
use std::sync::Arc;

use migrasim_engine::{DecisionStage, Engine, EventStage, ExecutionStage, LoggingObserver, Pipeline, SimulationConfig};
use migrasim_kernel::{MigrationCalculator, StandardAttractionCalculator, StandardMigrationCalculator, StandardModelConfig};
use migrasim_snapshot::{to_world, WorldPayload};
use migrasim_world::HaversineCalculator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const CONFIG_PATH: &str = "migrasim-config.yaml";
const SCENARIO_PATH: &str = "migrasim-scenario.yaml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("migrasim starting");

    let config = load_engine_config()?;
    info!(
        max_steps = config.max_steps,
        master_seed = config.master_seed,
        check_stability = config.check_stability,
        "engine configuration loaded"
    );

    let model_config = StandardModelConfig::default();
    let payload = load_scenario()?;
    let build = to_world(&payload)?;
    let world = build.world;
    info!(
        cities = world.cities().len(),
        persons = world.total_population(),
        events = build.events.len(),
        "world constructed"
    );

    let distance_calculator = Arc::new(HaversineCalculator);
    let attraction_calculator = Arc::new(StandardAttractionCalculator::new(model_config, distance_calculator));
    let migration_calculator: Arc<dyn MigrationCalculator + Sync> =
        Arc::new(StandardMigrationCalculator::new(attraction_calculator, model_config));

    let pipeline = Pipeline::new(vec![
        Box::new(DecisionStage::new(migration_calculator, config.master_seed)),
        Box::new(ExecutionStage::new(config.enforce_capacity)),
        Box::new(EventStage::new(build.events, config.master_seed, config.use_parallel_events)),
    ]);

    let mut engine = Engine::new(pipeline, config)?;
    engine.add_observer(Box::new(LoggingObserver::new()));

    let (world_after, outcome) = engine.run(world)?;

    info!(
        final_step = outcome.final_step,
        stopped_reason = ?outcome.stopped_reason,
        "migrasim run complete"
    );
    for city in world_after.cities() {
        info!(city = city.name(), population = city.population(), "final population");
    }

    Ok(())
}

/// Load `migrasim-config.yaml` if present, else engine defaults.
fn load_engine_config() -> Result<SimulationConfig, CliError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        info!(path = CONFIG_PATH, "config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

/// Load `migrasim-scenario.yaml` if present, else the built-in demo
/// scenario.
fn load_scenario() -> Result<WorldPayload, CliError> {
    let path = Path::new(SCENARIO_PATH);
    if !path.exists() {
        info!(path = SCENARIO_PATH, "scenario file not found, using built-in demo scenario");
        return Ok(scenario::built_in_demo());
    }
    let contents = std::fs::read_to_string(path).map_err(|cause| CliError::Scenario { message: cause.to_string() })?;
    serde_yml::from_str(&contents).map_err(|cause| CliError::Scenario { message: cause.to_string() })
}
