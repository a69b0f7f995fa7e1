//! CSV Output
//!
//! One row per test case, numbers unrounded. Missing values are empty cells.

use crate::report::{Report, ReportBody};
use perfcmp_stats::SampleStatistics;
use std::fmt::Write;

/// Generate a CSV report
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::new();

    match &report.result {
        ReportBody::ComparePerf(comparison) => {
            output.push_str(
                "label,verdict,factor_min,factor_max,before_mean,before_offset,after_mean,after_offset\n",
            );
            for case in &comparison.cases {
                let (factor_min, factor_max) = case
                    .factor_range
                    .map(|r| (r.min.to_string(), r.max.to_string()))
                    .unwrap_or_default();
                let (before_mean, before_offset) = stats_cells(case.before.as_ref());
                let (after_mean, after_offset) = stats_cells(case.after.as_ref());
                let _ = writeln!(
                    output,
                    "{},{},{},{},{},{},{},{}",
                    escape_csv(&case.label),
                    case.verdict,
                    factor_min,
                    factor_max,
                    before_mean,
                    before_offset,
                    after_mean,
                    after_offset
                );
            }
        }
        ReportBody::ValidatePerfcompare(validation) => {
            output.push_str("label,mismatch_rate,group_count\n");
            for test_case in &validation.test_cases {
                let _ = writeln!(
                    output,
                    "{},{},{}",
                    escape_csv(&test_case.label),
                    test_case.mismatch_rate,
                    test_case.group_count
                );
            }
        }
        ReportBody::CompareSizes(sizes) => {
            output.push_str("before,after,diff,factor\n");
            let factor = sizes.factor.map(|f| f.to_string()).unwrap_or_default();
            let _ = writeln!(
                output,
                "{},{},{},{}",
                sizes.before, sizes.after, sizes.diff, factor
            );
        }
    }

    output
}

fn stats_cells(stats: Option<&SampleStatistics>) -> (String, String) {
    stats
        .map(|s| (s.mean().to_string(), s.offset().to_string()))
        .unwrap_or_default()
}

/// Quote a field if it contains a delimiter, quote or newline
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportMeta;
    use perfcmp_logic::{ResultsMap, compare_results, compare_sizes};
    use perfcmp_stats::{DEFAULT_ALPHA, compute_sample_statistics};

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_comparison_rows() {
        let before = ResultsMap::new();
        let after: ResultsMap = [(
            "Label, with comma".to_string(),
            compute_sample_statistics(&[4.0, 6.0], DEFAULT_ALPHA).unwrap(),
        )]
        .into_iter()
        .collect();
        let report = Report::new(
            ReportMeta::new(Some(DEFAULT_ALPHA), Some(1)),
            ReportBody::ComparePerf(compare_results(&before, &after)),
        );
        let csv = generate_csv_report(&report);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("\"Label, with comma\",added,,,,,5,"));
    }

    #[test]
    fn test_sizes_row() {
        let report = Report::new(
            ReportMeta::new(None, None),
            ReportBody::CompareSizes(compare_sizes(0, 10)),
        );
        assert_eq!(generate_csv_report(&report), "before,after,diff,factor\n0,10,10,\n");
    }
}
