#![warn(missing_docs)]
//! # perfcmp
//!
//! Statistically rigorous comparison of performance test results gathered
//! across several reboots of a device.
//!
//! - **Multi-level sampling**: values are averaged per process run (after
//!   dropping warm-up values), then per boot; the per-boot means form the
//!   sample for a Student's t confidence interval
//! - **Conservative verdicts**: a test case is only reported faster or slower
//!   when the before/after intervals do not overlap
//! - **Methodology validation**: splits boots from one build into groups and
//!   measures how often intervals from identical builds fail to intersect
//! - **Size comparison**: compares total blob sizes of two system snapshots
//!
//! ## Library use
//!
//! ```ignore
//! use perfcmp::{AggregationConfig, aggregate_boots, compare_results, load_results_dir};
//!
//! let config = AggregationConfig::default();
//! let before = aggregate_boots(&load_results_dir("out/before".as_ref())?, &config)?;
//! let after = aggregate_boots(&load_results_dir("out/after".as_ref())?, &config)?;
//! let comparison = compare_results(&before, &after);
//! println!("{}", perfcmp::format_comparison(&comparison));
//! ```

// Re-export stats
pub use perfcmp_stats::{
    ConfidenceInterval, DEFAULT_ALPHA, SampleStatistics, compute_sample_statistics,
    mismatch_rate,
};

// Re-export logic types
pub use perfcmp_logic::{
    AggregationConfig, AnalysisError, BootResults, FactorRange, PerfComparison, ProcessRun,
    ResultsMap, SizeComparison, TestCaseComparison, TestCaseRun, ValidationConfig,
    ValidationReport, Verdict, aggregate_boots, compare_results, compare_sizes, validate_boots,
};

// Re-export report rendering
pub use perfcmp_report::{
    OutputFormat, Report, ReportBody, ReportMeta, format_comparison, format_validation, render,
};

// Re-export loading
pub use perfcmp_cli::{LoadError, load_boot, load_boots, load_results_dir, read_snapshot_total};

/// Run the perfcmp command-line tool.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     perfcmp::run()
/// }
/// ```
pub use perfcmp_cli::run;
