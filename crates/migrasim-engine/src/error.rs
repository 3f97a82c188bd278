//! The error taxonomy this crate raises (§7).
//!
//! `DecisionError`, `WorldError`, and `EventError` map to the
//! spec's `DecisionError`/`ExecutionError`/`EventError` kinds: local
//! recovery is favored for all three, so the shipped stages
//! (`stage::DecisionStage`, `stage::ExecutionStage`, `stage::EventStage`)
//! record a soft error on `context::SimulationContext` and keep going
//! rather than constructing a [`StageError`]. The [`StageError`] enum
//! itself stays part of the public surface so a custom [`crate::stage::Stage`]
//! can still choose to fail the whole run when that is the correct
//! policy for it.

use migrasim_events::EventError;
use migrasim_kernel::DecisionError;
use migrasim_world::WorldError;

use crate::config::ConfigError;

/// The cause attached to [`crate::observer::StoppedReason::StageFailed`]
/// when a stage raises something its own local-recovery policy does
/// not cover (§7 point 7, "uncaught non-`Cancelled` error from a
/// stage").
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    /// `DecisionStage` could not compute migration flows at all.
    #[error("decision stage failed: {0}")]
    Decision(#[from] DecisionError),
    /// `ExecutionStage` could not apply a migration flow.
    #[error("execution stage failed: {0}")]
    Execution(#[from] WorldError),
    /// `EventStage` could not evaluate or apply its events at all.
    #[error("event stage failed: {0}")]
    Event(#[from] EventError),
}

/// Errors constructing or running an [`crate::engine::Engine`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine's own [`crate::config::SimulationConfig`] failed
    /// validation (a `ConfigurationError` kind, §7: fails fast, never
    /// recovered).
    #[error("invalid engine configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// [`crate::pipeline::Pipeline::is_empty`] was true at the start
    /// of a run.
    #[error("pipeline has no stages configured")]
    NoStages,
    /// Building a bounded rayon thread pool for `max_parallelism`
    /// failed.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}
