//! Confidence Intervals
//!
//! Interval bounds and the pairwise mismatch rate used to estimate how often
//! two intervals drawn from identical data fail to overlap.

use serde::Serialize;
use thiserror::Error;

/// Confidence interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

/// Errors from mismatch rate computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MismatchError {
    /// Fewer than two intervals, so there are no pairs
    #[error("need at least 2 intervals to form a pair, got {got}")]
    TooFewIntervals {
        /// Number of intervals supplied
        got: usize,
    },
}

impl ConfidenceInterval {
    /// Create an interval from its bounds
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Distance between the bounds
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether the two intervals share interior points.
    ///
    /// Intervals that merely touch at an endpoint do not intersect, and a
    /// zero-width interval never intersects anything.
    pub fn intersects(&self, other: &ConfidenceInterval) -> bool {
        !(other.lower >= self.upper || other.upper <= self.lower)
    }
}

/// Fraction of unordered pairs of `intervals` that do not intersect.
///
/// This is the probability that two intervals drawn without replacement
/// from the set are disjoint.
pub fn mismatch_rate(intervals: &[ConfidenceInterval]) -> Result<f64, MismatchError> {
    let n = intervals.len();
    if n < 2 {
        return Err(MismatchError::TooFewIntervals { got: n });
    }

    let mismatches = (0..n)
        .flat_map(|i| (0..i).map(move |j| (i, j)))
        .filter(|&(i, j)| !intervals[i].intersects(&intervals[j]))
        .count();
    let pairs = n * (n - 1) / 2;

    Ok(mismatches as f64 / pairs as f64)
}
