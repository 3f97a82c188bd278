//! The person model for the migrasim simulation.
//!
//! A person is modeled as a small tagged variant ([`Person::Base`] /
//! [`Person::Standard`]) rather than through open inheritance, so that
//! calculators depending on standard-only fields can branch once per
//! person instead of paying dynamic dispatch in the decision hot loop.
//!
//! # Modules
//!
//! - [`person`] -- [`Person`], [`PersonCore`], [`BasePerson`], [`StandardPerson`]
//! - [`error`] -- [`PersonError`]

pub mod error;
pub mod person;

pub use error::PersonError;
pub use person::{BasePerson, Person, PersonCore, PersonKind, StandardPerson};
