//! Distance calculation between cities.
//!
//! Kept behind a trait (rather than a bare free function) so the
//! attraction kernel's resistance calculation can be exercised against
//! a fixed-distance stub in tests, per the specification's description
//! of resistance as a pluggable function of distance.

use migrasim_types::{Coordinate, EARTH_RADIUS_KM};

/// Computes the distance between two points on the Earth's surface.
pub trait DistanceCalculator: Send + Sync {
    /// Distance between `from` and `to`, in kilometers. Must be
    /// symmetric and return `0.0` for identical coordinates.
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64;
}

/// The great-circle (Haversine) distance calculator, the default used
/// throughout the simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineCalculator;

impl DistanceCalculator for HaversineCalculator {
    fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        let lat1 = from.latitude().to_radians();
        let lat2 = to.latitude().to_radians();
        let dlat = (to.latitude() - from.latitude()).to_radians();
        let dlon = (to.longitude() - from.longitude()).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }
}
