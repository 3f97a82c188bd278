//! The person model: a small tagged variant rather than open
//! inheritance, per the design note that attraction calculators should
//! branch once on the variant instead of paying a per-agent dispatch
//! cost in hot loops.

use std::collections::BTreeMap;

use migrasim_types::{CityId, FactorId, UnitValue};

use crate::error::PersonError;

/// Fields shared by every person variant.
///
/// All fields here are immutable after construction except
/// `current_city`, which is mutated exclusively by the owning world's
/// placement/move operations (the Rust equivalent of "City add/remove"
/// in the source specification, since the world — not the city —
/// holds the `Vec<Person>` that these fields live in).
#[derive(Debug, Clone, PartialEq)]
pub struct PersonCore {
    factor_sensitivity: BTreeMap<FactorId, UnitValue>,
    moving_willingness: UnitValue,
    retention_rate: UnitValue,
    tags: Vec<String>,
    current_city: Option<CityId>,
}

impl PersonCore {
    /// Construct the shared fields of a person.
    ///
    /// # Errors
    ///
    /// Returns [`PersonError::EmptyTag`] if any tag is an empty string.
    pub fn new(
        factor_sensitivity: BTreeMap<FactorId, UnitValue>,
        moving_willingness: UnitValue,
        retention_rate: UnitValue,
        tags: Vec<String>,
    ) -> Result<Self, PersonError> {
        if tags.iter().any(String::is_empty) {
            return Err(PersonError::EmptyTag);
        }
        Ok(Self {
            factor_sensitivity,
            moving_willingness,
            retention_rate,
            tags,
            current_city: None,
        })
    }

    /// This person's sensitivity weight for the given factor, or `None`
    /// if the mapping has no entry (the owning world fills gaps with a
    /// neutral value at construction and surfaces that it did so).
    #[must_use]
    pub fn sensitivity(&self, factor: FactorId) -> Option<UnitValue> {
        self.factor_sensitivity.get(&factor).copied()
    }

    /// The full factor-sensitivity mapping.
    #[must_use]
    pub const fn sensitivities(&self) -> &BTreeMap<FactorId, UnitValue> {
        &self.factor_sensitivity
    }

    /// Insert a default sensitivity entry for a factor the constructor
    /// did not cover. Called only by the owning world at construction
    /// time, never in the hot loop.
    pub fn fill_default_sensitivity(&mut self, factor: FactorId, neutral: UnitValue) {
        self.factor_sensitivity.entry(factor).or_insert(neutral);
    }

    /// Scalar propensity to move at all, in `[0,1]`.
    #[must_use]
    pub const fn moving_willingness(&self) -> UnitValue {
        self.moving_willingness
    }

    /// Scalar attachment to the current city, in `[0,1]`.
    #[must_use]
    pub const fn retention_rate(&self) -> UnitValue {
        self.retention_rate
    }

    /// Ordered list of short descriptive tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The city this person currently resides in, if any.
    #[must_use]
    pub const fn current_city(&self) -> Option<CityId> {
        self.current_city
    }

    /// Set the current city. Reserved for the owning world's
    /// placement/move operations.
    pub fn set_current_city(&mut self, city: Option<CityId>) {
        self.current_city = city;
    }
}

/// A base person: migration preferences with no additional tuning
/// beyond the shared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePerson {
    core: PersonCore,
}

impl BasePerson {
    /// Construct a base person from its shared fields.
    #[must_use]
    pub const fn new(core: PersonCore) -> Self {
        Self { core }
    }

    /// The shared fields.
    #[must_use]
    pub const fn core(&self) -> &PersonCore {
        &self.core
    }

    /// Mutable access to the shared fields.
    pub const fn core_mut(&mut self) -> &mut PersonCore {
        &mut self.core
    }
}

/// A standard person: the shared fields plus the extra tuning knobs
/// the standard attraction/migration calculators consume.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardPerson {
    core: PersonCore,
    sensitivity_scaling: UnitValue,
    attraction_threshold: UnitValue,
    min_acceptable_attraction: UnitValue,
}

impl StandardPerson {
    /// Construct a standard person.
    #[must_use]
    pub const fn new(
        core: PersonCore,
        sensitivity_scaling: UnitValue,
        attraction_threshold: UnitValue,
        min_acceptable_attraction: UnitValue,
    ) -> Self {
        Self {
            core,
            sensitivity_scaling,
            attraction_threshold,
            min_acceptable_attraction,
        }
    }

    /// The shared fields.
    #[must_use]
    pub const fn core(&self) -> &PersonCore {
        &self.core
    }

    /// Mutable access to the shared fields.
    pub const fn core_mut(&mut self) -> &mut PersonCore {
        &mut self.core
    }

    /// Multiplier applied to base attraction before clamping (§4.3.1).
    #[must_use]
    pub const fn sensitivity_scaling(&self) -> UnitValue {
        self.sensitivity_scaling
    }

    /// Minimum `adjusted(candidate) - adjusted(origin)` delta required
    /// for a candidate to be considered (§4.4 step 4).
    #[must_use]
    pub const fn attraction_threshold(&self) -> UnitValue {
        self.attraction_threshold
    }

    /// Minimum adjusted attraction a candidate city must clear to be
    /// considered at all (§4.4 step 4).
    #[must_use]
    pub const fn min_acceptable_attraction(&self) -> UnitValue {
        self.min_acceptable_attraction
    }
}

/// A discriminator for which concrete variant a [`Person`] holds,
/// without borrowing the person. Used by `World` to enforce the
/// homogeneous-per-world invariant without re-matching on every
/// insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKind {
    /// [`Person::Base`].
    Base,
    /// [`Person::Standard`].
    Standard,
}

/// A person in the simulation: either a [`BasePerson`] or a
/// [`StandardPerson`]. Modeled as a small tagged enum rather than open
/// inheritance, so a homogeneous-per-world invariant lets calculators
/// branch once instead of paying dynamic dispatch in hot loops.
#[derive(Debug, Clone, PartialEq)]
pub enum Person {
    /// A base person.
    Base(BasePerson),
    /// A standard person.
    Standard(StandardPerson),
}

impl Person {
    /// Which variant this person is.
    #[must_use]
    pub const fn kind(&self) -> PersonKind {
        match self {
            Self::Base(_) => PersonKind::Base,
            Self::Standard(_) => PersonKind::Standard,
        }
    }

    /// The shared fields, regardless of variant.
    #[must_use]
    pub const fn core(&self) -> &PersonCore {
        match self {
            Self::Base(p) => p.core(),
            Self::Standard(p) => p.core(),
        }
    }

    /// Mutable access to the shared fields, regardless of variant.
    pub const fn core_mut(&mut self) -> &mut PersonCore {
        match self {
            Self::Base(p) => p.core_mut(),
            Self::Standard(p) => p.core_mut(),
        }
    }

    /// The city this person currently resides in, if any.
    #[must_use]
    pub const fn current_city(&self) -> Option<CityId> {
        self.core().current_city()
    }
}
