//! The observer surface (§4.6): notifications delivered synchronously,
//! in registration order, as the engine drives a run.
//!
//! Mirrors the teacher's `runner::TickCallback` idiom -- a small
//! `Send` trait with a no-op implementation for tests -- generalized
//! to the full notification set a migration run emits, plus a
//! `tracing`-backed implementation matching the teacher's own logging
//! conventions.

use tracing::{info, warn};

use crate::context::SimulationContext;

/// Why a run halted (§4.1, §7 point 6-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppedReason {
    /// `CurrentStep` reached `SimulationConfig::max_steps`.
    MaxStepsReached,
    /// The stability criterion (§4.2) held.
    Stabilized,
    /// A cancellation signal was observed at a suspension point.
    Cancelled,
    /// A stage raised an error its own local-recovery policy does not
    /// cover.
    StageFailed,
}

/// A notification delivered to every registered [`SimulationObserver`]
/// (§4.1 "Public contract", §4.6).
#[derive(Debug, Clone)]
pub enum Notification<'a> {
    /// `Engine::run` has begun.
    SimulationStart,
    /// A new step has begun; carries the step number.
    StepStart(u64),
    /// A stage completed successfully this step.
    StageComplete(&'static str),
    /// Every stage this step has completed.
    StepComplete(&'a SimulationContext),
    /// The run has halted.
    SimulationEnd(StoppedReason),
    /// A non-fatal error was recovered from and reported rather than
    /// raised (§7's local-recovery policy) -- a decision, execution,
    /// event, or observer-internal failure.
    Error(&'a str),
}

/// Receives the notifications the engine emits while driving a run
/// (§4.1, §4.6).
///
/// Delivery is synchronous and in registration order (§4.6): an
/// observer that panics or otherwise misbehaves would stall every
/// later observer and the run itself, so [`Engine`](crate::engine::Engine)
/// never calls one directly outside [`crate::engine`]'s own
/// catch-and-report wrapper.
pub trait SimulationObserver: Send {
    /// Handle one notification. Implementations must not block on I/O
    /// the engine itself depends on, and must not hold a reference
    /// that would prevent the world from being torn down after the
    /// run completes.
    fn notify(&mut self, notification: &Notification<'_>);
}

/// An observer that discards every notification; useful as the
/// starting point for a run with no reporting needs, or in tests.
pub struct NoOpObserver;

impl SimulationObserver for NoOpObserver {
    fn notify(&mut self, _notification: &Notification<'_>) {}
}

/// An observer that logs every notification via `tracing`, matching
/// the teacher's `info!`/`warn!`/`debug!` structured-field logging
/// convention (§7.1).
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Construct a logging observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SimulationObserver for LoggingObserver {
    fn notify(&mut self, notification: &Notification<'_>) {
        match notification {
            Notification::SimulationStart => info!("simulation starting"),
            Notification::StepStart(step) => tracing::debug!(step, "step starting"),
            Notification::StageComplete(name) => tracing::debug!(stage = name, "stage complete"),
            Notification::StepComplete(context) => info!(
                step = context.current_step(),
                total_population_change = context.total_population_change(),
                max_city_population_change = context.max_city_population_change(),
                "step complete"
            ),
            Notification::SimulationEnd(reason) => info!(?reason, "simulation ended"),
            Notification::Error(message) => warn!(message, "recovered error"),
        }
    }
}

/// Delivers a notification to every observer in `observers`, in
/// order, catching and logging any panic from a misbehaving observer
/// so it cannot abort the run (§4.6 "Observer errors are caught,
/// reported through Error, and swallowed").
pub(crate) fn notify_all(observers: &mut [Box<dyn SimulationObserver>], notification: &Notification<'_>) {
    for observer in observers {
        if let Err(cause) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| observer.notify(notification))) {
            let message = cause
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "observer panicked".to_owned());
            warn!(message, "observer notification failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    struct RecordingObserver {
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SimulationObserver for RecordingObserver {
        fn notify(&mut self, notification: &Notification<'_>) {
            let label = match notification {
                Notification::SimulationStart => "start",
                Notification::StepStart(_) => "step_start",
                Notification::StageComplete(_) => "stage_complete",
                Notification::StepComplete(_) => "step_complete",
                Notification::SimulationEnd(_) => "end",
                Notification::Error(_) => "error",
            };
            self.seen.lock().expect("lock").push(label);
        }
    }

    #[test]
    fn no_op_observer_ignores_everything() {
        let mut observer = NoOpObserver;
        observer.notify(&Notification::SimulationStart);
    }

    #[test]
    fn a_panicking_observer_does_not_stop_later_observers_from_running() {
        struct PanickingObserver;
        impl SimulationObserver for PanickingObserver {
            fn notify(&mut self, _notification: &Notification<'_>) {
                panic!("boom");
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observers: Vec<Box<dyn SimulationObserver>> =
            vec![Box::new(PanickingObserver), Box::new(RecordingObserver { seen: Arc::clone(&seen) })];

        notify_all(&mut observers, &Notification::SimulationStart);
        notify_all(&mut observers, &Notification::StepStart(1));

        assert_eq!(*seen.lock().expect("lock"), vec!["start", "step_start"]);
    }
}
