//! Report Data Structures

use chrono::{DateTime, Utc};
use perfcmp_logic::{PerfComparison, SizeComparison, ValidationReport};
use serde::Serialize;

/// Complete report for one invocation
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Tool and run metadata
    pub meta: ReportMeta,
    /// Command result
    pub result: ReportBody,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    /// Version of the JSON layout
    pub schema_version: u32,
    /// perfcmp version that produced the report
    pub version: String,
    /// When the report was produced
    pub timestamp: DateTime<Utc>,
    /// Significance level; absent for size comparisons
    pub alpha: Option<f64>,
    /// Leading values dropped from each process run; absent for size comparisons
    pub warmup_runs: Option<usize>,
}

/// Result of one of the three commands
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBody {
    /// Before/after performance comparison
    ComparePerf(PerfComparison),
    /// Same-build mismatch rate validation
    ValidatePerfcompare(ValidationReport),
    /// Snapshot size comparison
    CompareSizes(SizeComparison),
}

impl ReportMeta {
    /// Metadata stamped with the current time
    pub fn new(alpha: Option<f64>, warmup_runs: Option<usize>) -> Self {
        Self {
            schema_version: 1,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            alpha,
            warmup_runs,
        }
    }
}

impl Report {
    /// Wrap a result with fresh metadata
    pub fn new(meta: ReportMeta, result: ReportBody) -> Self {
        Self { meta, result }
    }
}
