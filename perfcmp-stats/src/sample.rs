//! Sample Statistics
//!
//! Mean, Bessel-corrected standard deviation and a two-sided Student t
//! confidence interval for the population mean.
//!
//! The interval assumes the sampled values are (approximately) normally
//! distributed. Each value fed in here is itself a per-boot average, which
//! keeps that assumption reasonable for timing data.

use crate::interval::ConfidenceInterval;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Errors from computing sample statistics
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// No values at all
    #[error("mean is not defined for an empty sample")]
    Empty,

    /// Fewer than two values
    #[error(
        "sample size of {got} is too small to calculate standard deviation with Bessel's correction"
    )]
    Insufficient {
        /// Number of values supplied
        got: usize,
    },

    /// `alpha` outside `(0, 1)`
    #[error("invalid significance level: {0} (must be between 0 and 1)")]
    InvalidAlpha(f64),

    /// The t distribution could not be constructed
    #[error("t-distribution error: {0}")]
    Distribution(String),

    /// Finite values whose mean, deviation or interval overflowed
    #[error("statistics are not finite (mean {mean}, std dev {std_dev}, offset {offset})")]
    NonFinite {
        /// Computed mean
        mean: f64,
        /// Computed standard deviation
        std_dev: f64,
        /// Computed interval half-width
        offset: f64,
    },
}

/// Statistics for one test case, derived from its per-boot values.
///
/// Immutable once constructed; the interval always satisfies
/// `lower <= mean <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleStatistics {
    mean: f64,
    std_dev: f64,
    offset: f64,
    sample_count: usize,
    alpha: f64,
    interval: ConfidenceInterval,
}

/// Arithmetic mean of a non-empty sample.
pub fn mean(values: &[f64]) -> Result<f64, SampleError> {
    if values.is_empty() {
        return Err(SampleError::Empty);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean and standard deviation with Bessel's correction (divides by `n - 1`).
pub fn mean_and_std_dev(values: &[f64]) -> Result<(f64, f64), SampleError> {
    if values.len() < 2 {
        if values.is_empty() {
            return Err(SampleError::Empty);
        }
        return Err(SampleError::Insufficient { got: values.len() });
    }

    let mean = mean(values)?;
    let sum_of_squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let std_dev = (sum_of_squares / (values.len() - 1) as f64).sqrt();
    Ok((mean, std_dev))
}

/// Critical value `t` such that `P(|T| > t) = alpha` for `T ~ t(df)`.
///
/// Equivalent to `-T_inv(alpha / 2, df)`.
pub fn t_critical_value(alpha: f64, degrees_of_freedom: usize) -> Result<f64, SampleError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(SampleError::InvalidAlpha(alpha));
    }
    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom as f64)
        .map_err(|e| SampleError::Distribution(e.to_string()))?;
    Ok(-dist.inverse_cdf(alpha / 2.0))
}

/// Compute the mean and its confidence interval at significance level `alpha`.
///
/// `alpha` is the probability that the true mean lies outside the interval,
/// so `alpha = 0.01` gives a 99% interval.
pub fn compute_sample_statistics(
    values: &[f64],
    alpha: f64,
) -> Result<SampleStatistics, SampleError> {
    let (mean, std_dev) = mean_and_std_dev(values)?;
    let n = values.len();
    let offset = t_critical_value(alpha, n - 1)? * std_dev / (n as f64).sqrt();
    if !(mean.is_finite() && std_dev.is_finite() && offset.is_finite()) {
        return Err(SampleError::NonFinite {
            mean,
            std_dev,
            offset,
        });
    }

    Ok(SampleStatistics {
        mean,
        std_dev,
        offset,
        sample_count: n,
        alpha,
        interval: ConfidenceInterval::new(mean - offset, mean + offset),
    })
}

impl SampleStatistics {
    /// Sample mean
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation (Bessel-corrected)
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Half-width of the confidence interval
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Number of values the statistics were computed from
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Significance level the interval was computed at
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Confidence interval for the mean
    pub fn interval(&self) -> ConfidenceInterval {
        self.interval
    }

    /// Width of the confidence interval divided by the mean.
    ///
    /// Not finite when the mean is zero.
    pub fn relative_width(&self) -> f64 {
        self.offset * 2.0 / self.mean
    }

    /// `"<mean> +/- <offset>"` with both parts rounded to integers.
    pub fn format_interval(&self) -> String {
        format!(
            "{} +/- {}",
            self.mean.round() as i64,
            self.offset.round() as i64
        )
    }
}

impl std::fmt::Display for SampleStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_interval())
    }
}
