//! Deterministic tie-breaking for split selection
//!
//! Candidate splits with equal impurity are ordered by feature index, then
//! by threshold, so repeated fits on the same data yield identical trees.

use std::cmp::Ordering;

/// Two impurities closer than this are treated as equal
pub const IMPURITY_EPSILON: f64 = 1e-12;

/// Ordering key for split candidates with equal impurity
#[derive(Debug, Clone, Copy)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: f64,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: f64) -> Self {
        Self {
            feature_idx,
            threshold,
        }
    }
}

impl PartialEq for SplitTieBreaker {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SplitTieBreaker {}

impl PartialOrd for SplitTieBreaker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplitTieBreaker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.feature_idx
            .cmp(&other.feature_idx)
            .then_with(|| self.threshold.total_cmp(&other.threshold))
    }
}

/// Compare two weighted impurities, treating near-equal values as ties
pub fn compare_impurity(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= IMPURITY_EPSILON {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Threshold halfway between two consecutive distinct values
///
/// Always satisfies `lower <= t < upper`, so `lower` goes left and `upper`
/// goes right even when the midpoint rounds up.
pub fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower / 2.0 + upper / 2.0;
    if mid >= upper || mid < lower {
        lower
    } else {
        mid
    }
}
