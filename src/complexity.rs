// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Correlation-based complexity index.
//!
//! Each valid pair contributes `4·|r|·(1 − |r|)`: zero for independent or
//! fully redundant sources, 1.0 for moderately coupled ones (|r| = 0.5).
//! The index is the sum over all pairs.

use crate::correlation::CorrelationPair;
use std::collections::VecDeque;

/// Contribution of a single coefficient.
pub fn pair_contribution(r: f64) -> f64 {
    if !r.is_finite() {
        return 0.0;
    }
    let a = r.abs().min(1.0);
    4.0 * a * (1.0 - a)
}

/// Complexity index with its bounded history.
#[derive(Debug, Clone)]
pub struct ComplexityIndex {
    history: VecDeque<f64>,
    capacity: usize,
}

impl ComplexityIndex {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Complexity of a correlation matrix (no side effects).
    pub fn complexity(pairs: &[CorrelationPair]) -> f64 {
        pairs
            .iter()
            .filter(|p| p.valid)
            .fold(0.0, |acc, p| acc + pair_contribution(p.coefficient))
    }

    /// Append a value to the history, evicting the oldest on overflow.
    pub fn record(&mut self, value: f64) {
        self.history.push_back(value);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// History from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
