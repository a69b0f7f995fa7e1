#![warn(missing_docs)]
//! perfcmp Logic - Aggregation, Classification and Validation
//!
//! Turns per-boot benchmark results into per-test-case confidence intervals,
//! classifies before/after pairs as faster, slower or unchanged, and measures
//! the false-positive rate of that classification on same-build data.

mod aggregate;
mod classify;
mod error;
mod sizes;
mod validate;

pub use aggregate::{
    AggregationConfig, BootResults, DEFAULT_WARMUP_RUNS, ProcessRun, ResultsMap, TestCaseRun,
    aggregate_boots, collect_boot_samples, process_run_mean,
};
pub use classify::{
    FactorRange, PerfComparison, TestCaseComparison, Verdict, VerdictCounts, classify_intervals,
    compare_results, factor_range,
};
pub use error::AnalysisError;
pub use sizes::{SizeComparison, compare_sizes};
pub use validate::{LabelMismatch, ValidationConfig, ValidationReport, validate_boots};
