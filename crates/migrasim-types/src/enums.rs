//! Small shared enumerations used across the attraction/migration kernel
//! and the event engine.

use serde::{Deserialize, Serialize};

use crate::unit::UnitValue;

/// Whether a factor's intensity helps or hurts a city's attractiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Higher intensity increases attraction.
    Positive,
    /// Higher intensity decreases attraction (contribution uses
    /// `1 - intensity`).
    Negative,
}

/// A transform applied to a factor's raw intensity before it is used
/// in the attraction calculation. `Linear` is the identity transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    /// Identity: `transform(x) = x`.
    Linear,
    /// `transform(x) = ln(1 + x) / ln(2)`, normalized so `transform(1) ==
    /// 1`.
    Logarithmic,
    /// A logistic curve centered at 0.5 with the given steepness,
    /// renormalized so `transform(0) == 0` and `transform(1) == 1`.
    Sigmoid {
        /// Steepness of the logistic curve.
        steepness: f64,
    },
    /// `transform(x) = (exp(k·x) - 1) / (exp(k) - 1)`.
    Exponential {
        /// Growth-rate coefficient.
        k: f64,
    },
    /// `transform(x) = sqrt(x)`.
    SquareRoot,
}

impl Transform {
    /// Apply the transform to a raw intensity, producing a unit value.
    #[must_use]
    pub fn apply(self, x: UnitValue) -> UnitValue {
        let raw = x.get();
        let result = match self {
            Self::Linear => raw,
            Self::Logarithmic => (1.0 + raw).ln() / 2.0_f64.ln(),
            Self::Sigmoid { steepness } => {
                let centered = |v: f64| 1.0 / (1.0 + (-steepness * (v - 0.5)).exp());
                let at0 = centered(0.0);
                let at1 = centered(1.0);
                let span = at1 - at0;
                if span.abs() < f64::EPSILON {
                    raw
                } else {
                    (centered(raw) - at0) / span
                }
            }
            Self::Exponential { k } => {
                if k.abs() < f64::EPSILON {
                    raw
                } else {
                    ((k * raw).exp() - 1.0) / (k.exp() - 1.0)
                }
            }
            Self::SquareRoot => raw.sqrt(),
        };
        UnitValue::saturating(result)
    }
}

/// How a [`FactorChangeEffect`](../../migrasim-events/enum.Effect.html)'s
/// value producer output is combined with a factor's current intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    /// Replace the factor's intensity with the produced value.
    Absolute,
    /// Add the produced value to the factor's current intensity
    /// (saturating).
    Delta,
    /// Multiply the factor's current intensity by the produced value
    /// (saturating).
    Multiply,
    /// Linearly interpolate from the intensity at event start to the
    /// produced target over `duration` steps.
    LinearTransition,
    /// Interpolate from the intensity at event start to the produced
    /// target over `duration` steps, following the curve
    /// `start + (target - start) * log2(1 + k/duration)`.
    LogarithmicTransition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_transform_is_identity() {
        let v = UnitValue::new(0.37).expect("finite");
        assert!((Transform::Linear.apply(v).get() - 0.37).abs() < 1e-12);
    }

    #[test]
    fn logarithmic_transform_endpoints() {
        let zero = UnitValue::ZERO;
        let one = UnitValue::ONE;
        assert!((Transform::Logarithmic.apply(zero).get() - 0.0).abs() < 1e-9);
        assert!((Transform::Logarithmic.apply(one).get() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sigmoid_transform_endpoints() {
        let zero = UnitValue::ZERO;
        let one = UnitValue::ONE;
        let t = Transform::Sigmoid { steepness: 8.0 };
        assert!((t.apply(zero).get() - 0.0).abs() < 1e-9);
        assert!((t.apply(one).get() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn exponential_transform_endpoints() {
        let zero = UnitValue::ZERO;
        let one = UnitValue::ONE;
        let t = Transform::Exponential { k: 3.0 };
        assert!((t.apply(zero).get() - 0.0).abs() < 1e-9);
        assert!((t.apply(one).get() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn square_root_transform() {
        let v = UnitValue::new(0.25).expect("finite");
        assert!((Transform::SquareRoot.apply(v).get() - 0.5).abs() < 1e-12);
    }
}
