//! Size Comparison
//!
//! Byte totals of two build snapshots. No statistics involved.

use serde::Serialize;

/// Difference between two total sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeComparison {
    /// Total size of the "before" build in bytes
    pub before: u64,
    /// Total size of the "after" build in bytes
    pub after: u64,
    /// `after - before`, negative when the build shrank
    pub diff: i128,
    /// `after / before`; `None` when `before` is zero
    pub factor: Option<f64>,
}

/// Compare two total sizes in bytes
pub fn compare_sizes(before: u64, after: u64) -> SizeComparison {
    let factor = if before == 0 {
        None
    } else {
        Some(after as f64 / before as f64)
    };

    SizeComparison {
        before,
        after,
        diff: i128::from(after) - i128::from(before),
        factor,
    }
}
