//! Analysis Errors

use perfcmp_stats::SampleError;
use thiserror::Error;

/// Errors from aggregating, comparing or validating results.
///
/// Every variant names the test case or input it applies to. None of them
/// are recoverable by substituting a default: a missing mean must never be
/// reported as zero.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No values left to average
    #[error("test case '{label}' ({origin}): mean is not defined for an empty sample")]
    EmptySample {
        /// Test case label
        label: String,
        /// File or stage the empty sample came from
        origin: String,
    },

    /// Fewer than two per-boot values
    #[error(
        "test case '{label}': sample size of {got} is too small to calculate standard deviation \
         with Bessel's correction (results from at least 2 boots are needed)"
    )]
    InsufficientSample {
        /// Test case label
        label: String,
        /// Number of boots that produced a value
        got: usize,
    },

    /// A record that cannot be used as given
    #[error("malformed input in {origin}: {message}")]
    MalformedInput {
        /// File the record came from
        origin: String,
        /// What is wrong with it
        message: String,
    },

    /// A test case produced an interval in fewer than two groups
    #[error(
        "test case '{label}': only {groups} group(s) produced results, \
         at least 2 are needed to compute a mismatch rate"
    )]
    DegenerateValidation {
        /// Test case label
        label: String,
        /// Number of groups containing the test case
        groups: usize,
    },

    /// No complete group, or no test cases in any group
    #[error("no test case results in {boot_count} boot(s) with a group size of {group_size}")]
    NoValidationData {
        /// Boots supplied
        boot_count: usize,
        /// Requested group size
        group_size: usize,
    },

    /// Group size of zero
    #[error("group size must be at least 1")]
    InvalidGroupSize,

    /// Any other failure of the statistics engine
    #[error("test case '{label}': {source}")]
    Statistics {
        /// Test case label
        label: String,
        /// Underlying error
        #[source]
        source: SampleError,
    },
}

impl AnalysisError {
    /// Attach a test case label to an error from the statistics engine
    pub(crate) fn for_label(label: &str, err: SampleError) -> Self {
        match err {
            SampleError::Empty => AnalysisError::EmptySample {
                label: label.to_string(),
                origin: "across boots".to_string(),
            },
            SampleError::Insufficient { got } => AnalysisError::InsufficientSample {
                label: label.to_string(),
                got,
            },
            other => AnalysisError::Statistics {
                label: label.to_string(),
                source: other,
            },
        }
    }
}
