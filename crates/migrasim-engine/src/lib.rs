//! Pipeline, stages, and orchestration for the migration simulation.
//!
//! This crate owns the per-step engine loop that drives a
//! `migrasim_world::World` through decision, execution, and event
//! stages until the stability criterion holds, the configured step
//! limit is reached, or the run is cancelled.
//!
//! # Modules
//!
//! - [`config`] -- [`SimulationConfig`], loaded from `migrasim-config.yaml`.
//! - [`context`] -- [`context::SimulationContext`], the per-step carrier passed to every stage.
//! - [`stability`] -- [`stability::StabilityDetector`].
//! - [`stage`] -- [`stage::Stage`] and the built-in `DecisionStage`/`ExecutionStage`/`EventStage`.
//! - [`pipeline`] -- [`pipeline::Pipeline`], the ordered stage list.
//! - [`observer`] -- [`observer::SimulationObserver`] and the notifications it receives.
//! - [`engine`] -- [`Engine`], the top-level run loop.
//! - [`error`] -- [`error::StageError`], [`error::EngineError`].

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod stability;
pub mod stage;

pub use config::SimulationConfig;
pub use engine::{CancellationToken, Engine, RunOutcome};
pub use error::EngineError;
pub use observer::{LoggingObserver, NoOpObserver, Notification, SimulationObserver, StoppedReason};
pub use pipeline::Pipeline;
pub use stability::StabilityDetector;
pub use stage::{DecisionStage, EventStage, ExecutionStage, Stage};
