//! Stability detection (§4.2).

/// Decides whether a run has settled: starting at
/// `min_steps_before_check`, on every step divisible by
/// `check_interval`, the run is considered stabilized once
/// `TotalPopulationChange` no longer exceeds `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityDetector {
    enabled: bool,
    threshold: u64,
    check_interval: u64,
    min_steps_before_check: u64,
}

impl StabilityDetector {
    /// Construct a detector from the matching
    /// [`crate::config::SimulationConfig`] fields.
    #[must_use]
    pub const fn new(enabled: bool, threshold: u64, check_interval: u64, min_steps_before_check: u64) -> Self {
        Self {
            enabled,
            threshold,
            check_interval,
            min_steps_before_check,
        }
    }

    /// Whether `step`, given this step's `total_population_change`,
    /// counts as stabilized (§4.2 "Stability criterion").
    #[must_use]
    pub const fn is_stabilized(&self, step: u64, total_population_change: u64) -> bool {
        self.enabled
            && self.check_interval > 0
            && step >= self.min_steps_before_check
            && step % self.check_interval == 0
            && total_population_change <= self.threshold
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn disabled_detector_never_stabilizes() {
        let detector = StabilityDetector::new(false, 10, 1, 0);
        assert!(!detector.is_stabilized(100, 0));
    }

    #[test]
    fn stabilizes_once_change_is_at_or_below_threshold() {
        let detector = StabilityDetector::new(true, 10, 1, 0);
        assert!(detector.is_stabilized(5, 10));
        assert!(!detector.is_stabilized(5, 11));
    }

    #[test]
    fn respects_min_steps_before_check() {
        let detector = StabilityDetector::new(true, 10, 1, 20);
        assert!(!detector.is_stabilized(5, 0));
        assert!(detector.is_stabilized(20, 0));
    }

    #[test]
    fn respects_check_interval() {
        let detector = StabilityDetector::new(true, 10, 5, 0);
        assert!(!detector.is_stabilized(3, 0));
        assert!(detector.is_stabilized(5, 0));
        assert!(detector.is_stabilized(10, 0));
    }
}
