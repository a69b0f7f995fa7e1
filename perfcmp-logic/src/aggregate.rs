//! Boot Aggregation
//!
//! Results are gathered by a three-level sampling process:
//!
//! 1. The system under test is booted several times.
//! 2. Each boot launches the perf test process one or more times.
//! 3. Each process launch runs every test case body several times.
//!
//! The levels collapse bottom-up. Within a process run the first value(s) are
//! dropped as warm-up and the rest are averaged; within a boot the process
//! run means for a test case are averaged with equal weight; across boots the
//! per-boot values form the sample the confidence interval is computed from.
//! This accounts for variation across boots and across process launches.

use crate::AnalysisError;
use fxhash::FxHashMap;
use perfcmp_stats::{DEFAULT_ALPHA, SampleStatistics, compute_sample_statistics, mean};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of leading values dropped from each process run by default.
///
/// The first run of a test case inside a process is usually slower (process
/// start-up, cold caches, waiting for helper processes) and would skew the
/// mean.
pub const DEFAULT_WARMUP_RUNS: usize = 1;

/// Mapping from test case label to its statistics, ordered by label
pub type ResultsMap = BTreeMap<String, SampleStatistics>;

/// Values recorded for one test case by one process run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseRun {
    /// Test case label
    pub label: String,
    /// Measured values, in execution order
    pub values: Vec<f64>,
}

/// Results of one launch of a perf test process
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRun {
    /// Where the results came from (used in error messages)
    pub source: String,
    /// One record per test case the process executed
    pub test_cases: Vec<TestCaseRun>,
}

/// All process runs from one boot
#[derive(Debug, Clone, PartialEq)]
pub struct BootResults {
    /// Identifier of the boot (directory or archive name)
    pub id: String,
    /// Process runs in a deterministic order
    pub process_runs: Vec<ProcessRun>,
}

/// Configuration for aggregation
#[derive(Debug, Clone, Copy)]
pub struct AggregationConfig {
    /// Significance level for confidence intervals
    pub alpha: f64,
    /// Leading values dropped from each process run
    pub warmup_runs: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            warmup_runs: DEFAULT_WARMUP_RUNS,
        }
    }
}

/// Mean of one process run's values after dropping `warmup_runs` leading values.
pub fn process_run_mean(
    run: &TestCaseRun,
    source: &str,
    warmup_runs: usize,
) -> Result<f64, AnalysisError> {
    if let Some(bad) = run.values.iter().find(|v| !v.is_finite()) {
        return Err(AnalysisError::MalformedInput {
            origin: source.to_string(),
            message: format!("test case '{}' has non-finite value {}", run.label, bad),
        });
    }

    let measured = run.values.get(warmup_runs..).unwrap_or(&[]);
    mean(measured).map_err(|_| AnalysisError::EmptySample {
        label: run.label.clone(),
        origin: format!(
            "{}: {} value(s), none left after excluding {} warm-up run(s)",
            source,
            run.values.len(),
            warmup_runs
        ),
    })
}

/// Collapse the boot and process-run levels into one sample per label.
///
/// Each label maps to one value per boot that executed it, in boot order.
pub fn collect_boot_samples(
    boots: &[BootResults],
    warmup_runs: usize,
) -> Result<BTreeMap<String, Vec<f64>>, AnalysisError> {
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for boot in boots {
        let mut per_boot: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
        for run in &boot.process_runs {
            for test_case in &run.test_cases {
                let run_mean = process_run_mean(test_case, &run.source, warmup_runs)?;
                per_boot
                    .entry(test_case.label.as_str())
                    .or_default()
                    .push(run_mean);
            }
        }

        debug!(
            boot = %boot.id,
            process_runs = boot.process_runs.len(),
            test_cases = per_boot.len(),
            "collapsed boot"
        );

        for (label, run_means) in per_boot {
            let boot_value = mean(&run_means).map_err(|e| AnalysisError::for_label(label, e))?;
            samples.entry(label.to_string()).or_default().push(boot_value);
        }
    }

    Ok(samples)
}

/// Aggregate boots into per-label confidence intervals.
///
/// A label seen in fewer than 2 boots cannot be given an interval and fails
/// the whole aggregation.
pub fn aggregate_boots(
    boots: &[BootResults],
    config: &AggregationConfig,
) -> Result<ResultsMap, AnalysisError> {
    let samples = collect_boot_samples(boots, config.warmup_runs)?;

    let computed: Vec<Result<(String, SampleStatistics), AnalysisError>> = samples
        .into_par_iter()
        .map(|(label, values)| match compute_sample_statistics(&values, config.alpha) {
            Ok(stats) => Ok((label, stats)),
            Err(e) => Err(AnalysisError::for_label(&label, e)),
        })
        .collect();

    computed.into_iter().collect()
}
