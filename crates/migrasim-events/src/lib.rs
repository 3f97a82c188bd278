//! Scheduled city-factor mutations for the migration simulation (§4.5).
//!
//! An [`event::Event`] pairs a [`trigger::Trigger`] -- the predicate
//! that decides whether this step is the one -- with one or more
//! [`effect::Effect`]s that mutate factor intensities on a [`migrasim_world::World`].
//! Resolution happens in two passes: every effect target is computed
//! against an unmodified world first, and only written afterward, so a
//! `Composite` effect with several children either fully applies or
//! leaves the world untouched.
//!
//! # Modules
//!
//! - [`trigger`] -- [`trigger::Trigger`], [`trigger::TriggerState`]
//! - [`effect`] -- [`effect::Effect`], [`effect::ValueProducer`], [`effect::LazyValueSpec`]
//! - [`event`] -- [`event::Event`]
//! - [`error`] -- [`error::EventError`]

pub mod effect;
pub mod error;
pub mod event;
pub mod trigger;

pub use effect::{Effect, LazyValueSpec, ValueProducer};
pub use error::EventError;
pub use event::Event;
pub use trigger::{Trigger, TriggerState};
