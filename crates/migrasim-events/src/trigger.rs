//! Triggers: predicates over the simulation step that decide whether
//! an event fires this step (§4.5).

use serde::{Deserialize, Serialize};

/// Per-event fire history a trigger needs in order to evaluate itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerState {
    /// The step this event last fired on, if ever.
    pub last_fired_step: Option<u64>,
    /// Whether an externally-evaluated predicate currently holds.
    /// Meaningful only for [`Trigger::Conditional`]; the event stage
    /// evaluates the actual predicate since this crate has no notion
    /// of simulation context.
    pub predicate_holds: bool,
}

/// When an event's effects should apply.
///
/// Serializable directly, so a snapshot's event records embed a
/// `Trigger` as-is rather than through a duplicate schema (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Fires exactly once, at the given step.
    Step(u64),
    /// Fires at every step that is a multiple of `interval`, within an
    /// optional window.
    Periodic {
        /// Step interval between fires.
        interval: u64,
        /// Window start (inclusive); `None` means no lower bound.
        start_step: Option<u64>,
        /// Window end (inclusive); `None` means no upper bound.
        end_step: Option<u64>,
    },
    /// Fires every step within a closed window.
    Continuous {
        /// Window start (inclusive).
        start_step: u64,
        /// Window end (inclusive); `None` means unbounded.
        end_step: Option<u64>,
    },
    /// Fires whenever an externally-evaluated predicate holds, with an
    /// optional cooldown before it can fire again.
    Conditional {
        /// Minimum number of steps that must elapse after a fire
        /// before this trigger can fire again.
        cooldown_steps: Option<u64>,
    },
}

impl Trigger {
    /// Whether this trigger fires at `step`, given `state`.
    #[must_use]
    pub fn should_fire(&self, step: u64, state: &TriggerState) -> bool {
        match *self {
            Self::Step(target) => step == target,
            Self::Periodic {
                interval,
                start_step,
                end_step,
            } => {
                interval > 0
                    && start_step.is_none_or(|s| step >= s)
                    && end_step.is_none_or(|e| step <= e)
                    && step % interval == 0
            }
            Self::Continuous { start_step, end_step } => {
                step >= start_step && end_step.is_none_or(|e| step <= e)
            }
            Self::Conditional { cooldown_steps } => {
                state.predicate_holds
                    && state.last_fired_step.is_none_or(|last| {
                        cooldown_steps.is_none_or(|cooldown| step >= last.saturating_add(cooldown))
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_history() -> TriggerState {
        TriggerState::default()
    }

    #[test]
    fn step_trigger_fires_once_at_target() {
        let trigger = Trigger::Step(5);
        assert!(!trigger.should_fire(4, &no_history()));
        assert!(trigger.should_fire(5, &no_history()));
        assert!(!trigger.should_fire(6, &no_history()));
    }

    #[test]
    fn periodic_trigger_respects_interval_and_window() {
        let trigger = Trigger::Periodic {
            interval: 3,
            start_step: Some(3),
            end_step: Some(9),
        };
        assert!(!trigger.should_fire(2, &no_history()));
        assert!(trigger.should_fire(3, &no_history()));
        assert!(!trigger.should_fire(4, &no_history()));
        assert!(trigger.should_fire(6, &no_history()));
        assert!(trigger.should_fire(9, &no_history()));
        assert!(!trigger.should_fire(12, &no_history()));
    }

    #[test]
    fn continuous_trigger_fires_every_step_in_window() {
        let trigger = Trigger::Continuous {
            start_step: 2,
            end_step: Some(4),
        };
        assert!(!trigger.should_fire(1, &no_history()));
        assert!(trigger.should_fire(2, &no_history()));
        assert!(trigger.should_fire(3, &no_history()));
        assert!(trigger.should_fire(4, &no_history()));
        assert!(!trigger.should_fire(5, &no_history()));
    }

    #[test]
    fn continuous_trigger_with_no_end_is_unbounded() {
        let trigger = Trigger::Continuous {
            start_step: 10,
            end_step: None,
        };
        assert!(trigger.should_fire(10_000, &no_history()));
    }

    #[test]
    fn conditional_trigger_requires_predicate_and_respects_cooldown() {
        let trigger = Trigger::Conditional {
            cooldown_steps: Some(5),
        };
        let mut state = TriggerState {
            last_fired_step: None,
            predicate_holds: false,
        };
        assert!(!trigger.should_fire(1, &state));

        state.predicate_holds = true;
        assert!(trigger.should_fire(1, &state));

        state.last_fired_step = Some(1);
        assert!(!trigger.should_fire(3, &state));
        assert!(trigger.should_fire(6, &state));
    }

    #[test]
    fn conditional_trigger_without_cooldown_can_fire_every_step() {
        let trigger = Trigger::Conditional { cooldown_steps: None };
        let state = TriggerState {
            last_fired_step: Some(1),
            predicate_holds: true,
        };
        assert!(trigger.should_fire(2, &state));
    }
}
