//! Methodology Validation
//!
//! Measures how often the comparison would report a difference when there is
//! none. Boots from a single build are split into groups, each group is
//! aggregated as if it were one side of a real comparison, and the rate at
//! which intervals from different groups fail to intersect is reported per
//! test case.

use crate::{AggregationConfig, AnalysisError, BootResults, ResultsMap, aggregate_boots};
use perfcmp_stats::{ConfidenceInterval, SampleError, mean, mismatch_rate};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Configuration for validation
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    /// Number of boots per group; should match the number of boots per
    /// revision used for real comparisons
    pub group_size: usize,
    /// Aggregation applied to every group
    pub aggregation: AggregationConfig,
}

impl ValidationConfig {
    /// Default aggregation with the given group size
    pub fn with_group_size(group_size: usize) -> Self {
        Self {
            group_size,
            aggregation: AggregationConfig::default(),
        }
    }
}

/// Mismatch rate for one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMismatch {
    /// Test case label
    pub label: String,
    /// Fraction of group pairs whose intervals do not intersect
    pub mismatch_rate: f64,
    /// Number of groups that produced this test case
    pub group_count: usize,
}

/// Summary of a validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Per-test-case mismatch rates, sorted by label
    pub test_cases: Vec<LabelMismatch>,
    /// Mean of the per-test-case mismatch rates
    pub mean_mismatch_rate: f64,
    /// Mean of `2 * offset / mean` over every (group, test case) pair
    pub mean_relative_ci_width: f64,
    /// Expected number of test cases that would be reported as changed
    /// in a comparison of two identical builds
    pub expected_mismatch_count: f64,
    /// Number of complete groups
    pub group_count: usize,
    /// Boots per group
    pub group_size: usize,
    /// Boots supplied, including leftovers
    pub boot_count: usize,
    /// Trailing boots that did not fill a whole group
    pub leftover_boots: usize,
}

impl ValidationReport {
    /// Number of test cases with a mismatch rate
    pub fn test_case_count(&self) -> usize {
        self.test_cases.len()
    }
}

/// Split `boots` into contiguous groups and measure interval mismatch rates.
pub fn validate_boots(
    boots: &[BootResults],
    config: &ValidationConfig,
) -> Result<ValidationReport, AnalysisError> {
    let group_size = config.group_size;
    if group_size == 0 {
        return Err(AnalysisError::InvalidGroupSize);
    }

    let boot_count = boots.len();
    let group_count = boot_count / group_size;
    let leftover_boots = boot_count - group_count * group_size;
    if leftover_boots > 0 {
        warn!(leftover_boots, group_size, "ignoring boots that do not fill a group");
    }

    let grouped: Vec<Result<ResultsMap, AnalysisError>> = boots
        .par_chunks_exact(group_size)
        .map(|group| aggregate_boots(group, &config.aggregation))
        .collect();
    let groups: Vec<ResultsMap> = grouped.into_iter().collect::<Result<_, _>>()?;

    let mut by_label: BTreeMap<&str, Vec<ConfidenceInterval>> = BTreeMap::new();
    for results in &groups {
        for (label, stats) in results {
            by_label.entry(label).or_default().push(stats.interval());
        }
    }

    if by_label.is_empty() {
        return Err(AnalysisError::NoValidationData {
            boot_count,
            group_size,
        });
    }

    let test_cases = by_label
        .into_iter()
        .map(|(label, intervals)| -> Result<LabelMismatch, AnalysisError> {
            let rate =
                mismatch_rate(&intervals).map_err(|_| AnalysisError::DegenerateValidation {
                    label: label.to_string(),
                    groups: intervals.len(),
                })?;
            Ok(LabelMismatch {
                label: label.to_string(),
                mismatch_rate: rate,
                group_count: intervals.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rates: Vec<f64> = test_cases.iter().map(|t| t.mismatch_rate).collect();
    let widths: Vec<f64> = groups
        .iter()
        .flat_map(|results| results.values().map(|s| s.relative_width()))
        .collect();

    // Both are non-empty once a label has been seen in two groups
    let no_data = |_: SampleError| AnalysisError::NoValidationData {
        boot_count,
        group_size,
    };
    let mean_mismatch_rate = mean(&rates).map_err(no_data)?;
    let mean_relative_ci_width = mean(&widths).map_err(no_data)?;

    info!(
        groups = group_count,
        test_cases = test_cases.len(),
        mean_mismatch_rate,
        "validated interval mismatch rates"
    );

    Ok(ValidationReport {
        expected_mismatch_count: mean_mismatch_rate * test_cases.len() as f64,
        test_cases,
        mean_mismatch_rate,
        mean_relative_ci_width,
        group_count,
        group_size,
        boot_count,
        leftover_boots,
    })
}
