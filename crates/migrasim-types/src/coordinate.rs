//! Geographic coordinates.
//!
//! Distance computation lives in `migrasim-world::distance` (it needs
//! to be swappable behind a calculator trait and doesn't belong to the
//! bare value type), but the coordinate itself — and the constant both
//! that module and any future calculator need — live here so every
//! crate can depend on a single definition.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used by the Haversine distance
/// calculator. Lives alongside [`Coordinate`] since any distance
/// calculator implementation needs it.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth's surface in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, in `[-90, 90]`.
    latitude: f64,
    /// Longitude in degrees, in `[-180, 180]`.
    longitude: f64,
}

/// Error returned when constructing a [`Coordinate`] with an
/// out-of-range or non-finite component.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    /// Latitude was not in `[-90, 90]` or was not finite.
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),
    /// Longitude was not in `[-180, 180]` or was not finite.
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),
}

impl Coordinate {
    /// Construct a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is non-finite or
    /// outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }
}
