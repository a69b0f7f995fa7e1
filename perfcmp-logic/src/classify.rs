//! Regression Classification
//!
//! Compares the confidence intervals of a "before" and an "after" results map.
//! Non-overlapping intervals mean performance improved or regressed; intervals
//! that only touch at an endpoint count as non-overlapping.

use crate::ResultsMap;
use perfcmp_stats::{ConfidenceInterval, SampleStatistics};
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of comparing one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Only present in the "after" results
    Added,
    /// Only present in the "before" results
    Removed,
    /// After's interval lies entirely below before's
    Faster,
    /// After's interval lies entirely above before's
    Slower,
    /// Intervals overlap
    NoSigDiff,
}

impl Verdict {
    /// Name used in reports
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Added => "added",
            Verdict::Removed => "removed",
            Verdict::Faster => "faster",
            Verdict::Slower => "slower",
            Verdict::NoSigDiff => "no_sig_diff",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plausible range of the true after/before ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorRange {
    /// `after.lower / before.upper`
    pub min: f64,
    /// `after.upper / before.lower`
    pub max: f64,
}

impl std::fmt::Display for FactorRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}-{:.3}", self.min, self.max)
    }
}

/// Comparison result for one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseComparison {
    /// Test case label
    pub label: String,
    /// How the test case changed
    pub verdict: Verdict,
    /// `None` for added and removed test cases
    pub factor_range: Option<FactorRange>,
    /// Statistics from the "before" results, if present
    pub before: Option<SampleStatistics>,
    /// Statistics from the "after" results, if present
    pub after: Option<SampleStatistics>,
}

/// Number of test cases per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    /// Test cases only in "after"
    pub added: usize,
    /// Test cases only in "before"
    pub removed: usize,
    /// Test cases that got faster
    pub faster: usize,
    /// Test cases that got slower
    pub slower: usize,
    /// Test cases with overlapping intervals
    pub no_sig_diff: usize,
}

impl VerdictCounts {
    /// Count one more test case with this verdict
    pub fn record(&mut self, verdict: Verdict) {
        *self.slot(verdict) += 1;
    }

    /// Count for a single verdict
    pub fn get(&self, verdict: Verdict) -> usize {
        match verdict {
            Verdict::Added => self.added,
            Verdict::Removed => self.removed,
            Verdict::Faster => self.faster,
            Verdict::Slower => self.slower,
            Verdict::NoSigDiff => self.no_sig_diff,
        }
    }

    /// Total number of test cases
    pub fn total(&self) -> usize {
        self.added + self.removed + self.faster + self.slower + self.no_sig_diff
    }

    /// Test cases with any verdict other than `no_sig_diff`
    pub fn changed(&self) -> usize {
        self.total() - self.no_sig_diff
    }

    fn slot(&mut self, verdict: Verdict) -> &mut usize {
        match verdict {
            Verdict::Added => &mut self.added,
            Verdict::Removed => &mut self.removed,
            Verdict::Faster => &mut self.faster,
            Verdict::Slower => &mut self.slower,
            Verdict::NoSigDiff => &mut self.no_sig_diff,
        }
    }
}

/// Comparison of two results maps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfComparison {
    /// One entry per label in either map, sorted by label
    pub cases: Vec<TestCaseComparison>,
    /// Number of test cases per verdict
    pub counts: VerdictCounts,
}

impl PerfComparison {
    /// Test cases whose verdict is not `no_sig_diff`, in label order
    pub fn differences(&self) -> impl Iterator<Item = &TestCaseComparison> {
        self.cases
            .iter()
            .filter(|c| c.verdict != Verdict::NoSigDiff)
    }

    /// Whether any test case got slower
    pub fn has_regressions(&self) -> bool {
        self.counts.slower > 0
    }

    /// Look up the comparison for a label
    pub fn get(&self, label: &str) -> Option<&TestCaseComparison> {
        self.cases
            .binary_search_by(|c| c.label.as_str().cmp(label))
            .ok()
            .map(|i| &self.cases[i])
    }
}

/// Classify two intervals for the same test case.
///
/// `slower` is checked first, so a zero-width interval compared with itself
/// is reported as `slower`.
pub fn classify_intervals(before: &ConfidenceInterval, after: &ConfidenceInterval) -> Verdict {
    if after.lower >= before.upper {
        Verdict::Slower
    } else if after.upper <= before.lower {
        Verdict::Faster
    } else {
        Verdict::NoSigDiff
    }
}

/// Range of after/before ratios consistent with both intervals
pub fn factor_range(before: &ConfidenceInterval, after: &ConfidenceInterval) -> FactorRange {
    FactorRange {
        min: after.lower / before.upper,
        max: after.upper / before.lower,
    }
}

/// Compare every test case in `before` and `after`.
pub fn compare_results(before: &ResultsMap, after: &ResultsMap) -> PerfComparison {
    let labels: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    let mut counts = VerdictCounts::default();
    let cases: Vec<TestCaseComparison> = labels
        .into_iter()
        .map(|label| {
            let b = before.get(label);
            let a = after.get(label);
            let (verdict, factor_range) = match (b, a) {
                (Some(b), Some(a)) => {
                    let (bi, ai) = (b.interval(), a.interval());
                    (classify_intervals(&bi, &ai), Some(factor_range(&bi, &ai)))
                }
                (None, _) => (Verdict::Added, None),
                (_, None) => (Verdict::Removed, None),
            };
            counts.record(verdict);

            TestCaseComparison {
                label: label.clone(),
                verdict,
                factor_range,
                before: b.cloned(),
                after: a.cloned(),
            }
        })
        .collect();

    PerfComparison { cases, counts }
}
