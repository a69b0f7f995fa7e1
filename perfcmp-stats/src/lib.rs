#![warn(missing_docs)]
//! perfcmp Statistical Engine
//!
//! Confidence-interval arithmetic behind perfcmp's verdicts:
//! - Mean and Bessel-corrected standard deviation
//! - Two-sided Student t confidence intervals for the mean
//! - Interval intersection and pairwise mismatch rates

mod interval;
mod sample;

pub use interval::{ConfidenceInterval, MismatchError, mismatch_rate};
pub use sample::{
    SampleError, SampleStatistics, compute_sample_statistics, mean, mean_and_std_dev,
    t_critical_value,
};

/// Default significance level (99% two-sided confidence intervals)
pub const DEFAULT_ALPHA: f64 = 0.01;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!((DEFAULT_ALPHA - 0.01).abs() < f64::EPSILON);
    }
}
