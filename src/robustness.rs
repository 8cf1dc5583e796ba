// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Robustness score and total information tracking.

use crate::calibration::Thresholds;
use std::collections::VecDeque;

/// Maps current complexity onto the calibrated range.
///
/// 1.0 means far from the critical complexity, 0.0 at or beyond it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustnessEstimator;

impl RobustnessEstimator {
    /// Robustness of `complexity` against `thresholds`.
    ///
    /// Uncalibrated or degenerate (`c_critical <= c_min`) ranges give 1.0.
    pub fn robustness(thresholds: Option<Thresholds>, complexity: f64) -> f64 {
        let Some(t) = thresholds else {
            return 1.0;
        };
        let span = t.c_critical - t.c_min;
        if span.is_nan() || span <= 0.0 || !complexity.is_finite() {
            return 1.0;
        }
        ((t.c_critical - complexity) / span).clamp(0.0, 1.0)
    }
}

/// Rolling history of total information (entropy + complexity).
#[derive(Debug, Clone)]
pub struct InformationTracker {
    history: VecDeque<f64>,
    capacity: usize,
}

impl InformationTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(2),
        }
    }

    /// Record a value and return its difference to the previous one
    /// (0 on the first call).
    pub fn record(&mut self, total_information: f64) -> f64 {
        let previous = self.history.back().copied();
        self.history.push_back(total_information);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        previous.map_or(0.0, |p| total_information - p)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn thresholds(c_critical: f64, c_min: f64) -> Option<Thresholds> {
        Some(Thresholds { c_critical, c_min })
    }

    #[test]
    fn test_uncalibrated_is_fully_robust() {
        assert_eq!(RobustnessEstimator::robustness(None, 42.0), 1.0);
    }

    #[test]
    fn test_linear_between_bounds() {
        let t = thresholds(3.0, 1.0);
        assert_abs_diff_eq!(RobustnessEstimator::robustness(t, 1.0), 1.0);
        assert_abs_diff_eq!(RobustnessEstimator::robustness(t, 2.0), 0.5);
        assert_abs_diff_eq!(RobustnessEstimator::robustness(t, 3.0), 0.0);
    }

    #[test]
    fn test_clamped() {
        let t = thresholds(3.0, 1.0);
        assert_eq!(RobustnessEstimator::robustness(t, 10.0), 0.0);
        assert_eq!(RobustnessEstimator::robustness(t, -5.0), 1.0);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(RobustnessEstimator::robustness(thresholds(2.0, 2.0), 5.0), 1.0);
        assert_eq!(RobustnessEstimator::robustness(thresholds(1.0, 2.0), 0.0), 1.0);
    }

    #[test]
    fn test_information_delta() {
        let mut tracker = InformationTracker::new(20);
        assert_eq!(tracker.record(5.0), 0.0);
        assert_abs_diff_eq!(tracker.record(7.5), 2.5);
        assert_abs_diff_eq!(tracker.record(7.0), -0.5);
        assert_eq!(tracker.record(7.0), 0.0);
    }

    #[test]
    fn test_information_bounded() {
        let mut tracker = InformationTracker::new(3);
        for i in 0..10 {
            tracker.record(i as f64);
        }
        assert_eq!(tracker.len(), 3);
        tracker.clear();
        assert!(tracker.is_empty());
        assert_eq!(tracker.record(1.0), 0.0);
    }
}
