//! The top-level simulation engine (§4.1).
//!
//! Drives a [`migrasim_world::World`] through integer steps via a
//! [`Pipeline`], checking the stability criterion and cancellation
//! flag between steps, and reporting progress to every registered
//! [`SimulationObserver`]. Synchronous rather than `tokio`-driven: the
//! core has no I/O-bound work of its own, only CPU-bound rayon
//! fan-out inside a stage, which is the same "no async runtime where
//! nothing actually awaits" discipline the teacher's own
//! `emergence-core` crate (as opposed to its NATS/axum-facing
//! binaries) follows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use migrasim_world::World;

use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::error::EngineError;
use crate::observer::{notify_all, Notification, SimulationObserver, StoppedReason};
use crate::pipeline::Pipeline;
use crate::stability::StabilityDetector;

/// The outcome of a completed [`Engine::run`] call (§4.1 "Public
/// contract").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// The last step number executed (0 if the run halted before any
    /// step began, e.g. immediate cancellation).
    pub final_step: u64,
    /// Why the run halted.
    pub stopped_reason: StoppedReason,
}

/// A shared flag any holder can raise to request the run stop at its
/// next suspension point (§4.1 "Cancellation", §5 "Cancellation &
/// timeouts").
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Construct a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Drives a world through steps via a [`Pipeline`] until the
/// stability criterion holds, the configured step limit is reached,
/// cancellation is requested, or a stage fails (§4.1).
pub struct Engine {
    pipeline: Pipeline,
    config: SimulationConfig,
    stability: StabilityDetector,
    observers: Vec<Box<dyn SimulationObserver>>,
    cancellation: CancellationToken,
}

impl Engine {
    /// Construct an engine from a validated pipeline and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if `config` fails
    /// [`SimulationConfig::validate`], and [`EngineError::NoStages`]
    /// if `pipeline` has no stages.
    pub fn new(pipeline: Pipeline, config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Configuration)?;
        if pipeline.is_empty() {
            return Err(EngineError::NoStages);
        }
        let stability = StabilityDetector::new(
            config.check_stability,
            config.stability_threshold,
            config.stability_check_interval,
            config.min_steps_before_stability_check,
        );
        Ok(Self {
            pipeline,
            config,
            stability,
            observers: Vec::new(),
            cancellation: CancellationToken::new(),
        })
    }

    /// Register an observer. Observers are notified in registration
    /// order (§4.6).
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// A token that can be cloned out and used to cancel this engine's
    /// run from another thread.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Drive `world` through steps until a [`StoppedReason`] applies
    /// (§4.1 "Per-step protocol").
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ThreadPool`] only if a bounded thread
    /// pool could not be built for `config.max_parallelism`; a stage
    /// failure is reported as `Ok` with `stopped_reason ==
    /// StoppedReason::StageFailed` rather than propagated as an
    /// `Err`, since the caller still receives the partial `World` and
    /// the step it stopped at.
    pub fn run(&mut self, mut world: World) -> Result<(World, RunOutcome), EngineError> {
        let pool = self.build_thread_pool()?;
        let mut context = SimulationContext::new();

        notify_all(&mut self.observers, &Notification::SimulationStart);

        if self.cancellation.is_cancelled() {
            let outcome = RunOutcome { final_step: 0, stopped_reason: StoppedReason::Cancelled };
            notify_all(&mut self.observers, &Notification::SimulationEnd(StoppedReason::Cancelled));
            return Ok((world, outcome));
        }

        let outcome = match &pool {
            Some(pool) => pool.install(|| self.drive(&mut world, &mut context)),
            None => self.drive(&mut world, &mut context),
        };

        notify_all(&mut self.observers, &Notification::SimulationEnd(outcome.stopped_reason));
        Ok((world, outcome))
    }

    fn drive(&mut self, world: &mut World, context: &mut SimulationContext) -> RunOutcome {
        loop {
            if self.cancellation.is_cancelled() {
                return RunOutcome { final_step: context.current_step(), stopped_reason: StoppedReason::Cancelled };
            }

            let step = context.current_step().saturating_add(1);
            context.begin_step(step);
            notify_all(&mut self.observers, &Notification::StepStart(step));

            let stage_result = self.pipeline.run_step(world, context, |name| {
                notify_all(&mut self.observers, &Notification::StageComplete(name));
            });

            if let Err((name, cause)) = stage_result {
                let message = format!("stage '{name}' failed: {cause}");
                notify_all(&mut self.observers, &Notification::Error(&message));
                return RunOutcome { final_step: step, stopped_reason: StoppedReason::StageFailed };
            }

            notify_all(&mut self.observers, &Notification::StepComplete(context));

            for message in context.take_soft_errors() {
                notify_all(&mut self.observers, &Notification::Error(&message));
            }

            if self.stability.is_stabilized(step, context.total_population_change()) {
                return RunOutcome { final_step: step, stopped_reason: StoppedReason::Stabilized };
            }

            if self.cancellation.is_cancelled() {
                return RunOutcome { final_step: step, stopped_reason: StoppedReason::Cancelled };
            }

            if step >= self.config.max_steps {
                return RunOutcome { final_step: step, stopped_reason: StoppedReason::MaxStepsReached };
            }
        }
    }

    fn build_thread_pool(&self) -> Result<Option<rayon::ThreadPool>, EngineError> {
        match self.config.max_parallelism {
            None => Ok(None),
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map(Some)
                .map_err(|cause| EngineError::ThreadPool(cause.to_string())),
        }
    }
}
