//! Factor definitions: the named dimensions along which a city's
//! attractiveness is evaluated (jobs, climate, cost of living, and so
//! on).

use migrasim_types::{Polarity, Transform};

/// A named dimension of city attractiveness.
///
/// Every city in a world must carry an intensity for every
/// [`FactorDefinition`] the world declares (data model invariant 1).
/// The definition itself carries no per-city data — just how a raw
/// intensity should be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorDefinition {
    name: String,
    polarity: Polarity,
    transform: Transform,
}

impl FactorDefinition {
    /// Construct a factor definition.
    #[must_use]
    pub const fn new(name: String, polarity: Polarity, transform: Transform) -> Self {
        Self {
            name,
            polarity,
            transform,
        }
    }

    /// The factor's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether higher raw intensity helps or hurts attraction.
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The transform applied to raw intensity before it contributes to
    /// attraction.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use migrasim_types::UnitValue;

    use super::*;

    #[test]
    fn accessors_round_trip() {
        let def = FactorDefinition::new(
            "job_market".to_owned(),
            Polarity::Positive,
            Transform::Linear,
        );
        assert_eq!(def.name(), "job_market");
        assert_eq!(def.polarity(), Polarity::Positive);
        assert!((def.transform().apply(UnitValue::ONE).get() - 1.0).abs() < 1e-12);
    }
}
