//! Human-Readable Output
//!
//! Plain-text reports with fixed-width tables for terminals and CI logs.

use crate::report::{Report, ReportBody};
use perfcmp_logic::{
    PerfComparison, SizeComparison, TestCaseComparison, ValidationReport, Verdict,
};
use perfcmp_stats::SampleStatistics;
use std::fmt::Write;

const COMPARISON_HEADINGS: [&str; 5] = [
    "Test case",
    "Improve/regress?",
    "Factor change",
    "Mean before",
    "Mean after",
];

/// Format a report for terminal display
pub fn format_human_output(report: &Report) -> String {
    match &report.result {
        ReportBody::ComparePerf(comparison) => format_comparison(comparison),
        ReportBody::ValidatePerfcompare(validation) => format_validation(validation),
        ReportBody::CompareSizes(sizes) => format_sizes(sizes),
    }
}

/// Lay out rows as left-aligned columns separated by at least two spaces.
///
/// The heading row is underlined with dashes. The last column is not padded.
/// Missing cells in a short row are left blank; cells past the last heading
/// are dropped.
pub fn format_table(headings: &[&str], rows: &[Vec<String>]) -> String {
    let column_count = headings.len();
    let widths: Vec<usize> = (0..column_count)
        .map(|col| {
            let body = rows.iter().map(|row| cell(row, col).chars().count());
            body.chain(std::iter::once(cell_width(headings[col])))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let heading_row: Vec<String> = headings.iter().map(|h| h.to_string()).collect();
    let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut output = String::new();
    for row in std::iter::once(&heading_row)
        .chain(std::iter::once(&underline))
        .chain(rows.iter())
    {
        for (col, width) in widths.iter().enumerate() {
            let value = cell(row, col);
            output.push_str(value);
            if col + 1 < column_count {
                let padding = width + 2 - cell_width(value);
                output.push_str(&" ".repeat(padding));
            }
        }
        output.push('\n');
    }
    output
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", String::as_str)
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn format_stats(stats: Option<&SampleStatistics>) -> String {
    stats
        .map(SampleStatistics::format_interval)
        .unwrap_or_else(|| "-".to_string())
}

fn comparison_row(case: &TestCaseComparison) -> Vec<String> {
    vec![
        case.label.clone(),
        case.verdict.to_string(),
        case.factor_range
            .map(|range| range.to_string())
            .unwrap_or_else(|| "-".to_string()),
        format_stats(case.before.as_ref()),
        format_stats(case.after.as_ref()),
    ]
}

fn format_count(output: &mut String, count: usize, text: &str) {
    let noun = if count == 1 { "test case" } else { "test cases" };
    let _ = writeln!(output, "  {} {} {}", count, noun, text);
}

/// Summary counts, then the changed test cases, then every test case
pub fn format_comparison(comparison: &PerfComparison) -> String {
    let counts = &comparison.counts;
    let mut output = String::new();

    output.push_str("Summary counts:\n");
    format_count(&mut output, counts.total(), "in total");
    format_count(
        &mut output,
        counts.get(Verdict::NoSigDiff),
        "had no significant difference (no_sig_diff)",
    );
    format_count(&mut output, counts.get(Verdict::Faster), "got faster");
    format_count(&mut output, counts.get(Verdict::Slower), "got slower");
    format_count(&mut output, counts.get(Verdict::Added), "added");
    format_count(&mut output, counts.get(Verdict::Removed), "removed");
    output.push_str("\n\n");

    let diff_rows: Vec<Vec<String>> = comparison.differences().map(comparison_row).collect();
    if !diff_rows.is_empty() {
        output.push_str("Results from test cases with differences:\n\n");
        output.push_str(&format_table(&COMPARISON_HEADINGS, &diff_rows));
        output.push_str("\n\n");
    }

    let all_rows: Vec<Vec<String>> = comparison.cases.iter().map(comparison_row).collect();
    output.push_str("Results from all test cases:\n\n");
    output.push_str(&format_table(&COMPARISON_HEADINGS, &all_rows));

    output
}

/// Per-test mismatch rates followed by the summary lines
pub fn format_validation(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str(
        "Rate of mismatches (non-intersections) of confidence intervals for each test:\n",
    );
    for test_case in &report.test_cases {
        let _ = writeln!(output, "{:.6} {}", test_case.mismatch_rate, test_case.label);
    }

    output.push('\n');
    let _ = writeln!(output, "Mean mismatch rate: {:.6}", report.mean_mismatch_rate);
    let _ = writeln!(
        output,
        "Mean relative confidence interval width: {:.6}",
        report.mean_relative_ci_width
    );
    let _ = writeln!(output, "Number of test cases: {}", report.test_case_count());
    let _ = writeln!(
        output,
        "Number of result sets: {} groups of {} boots each (ignoring {} leftover boots)",
        report.group_count, report.group_size, report.leftover_boots
    );
    let _ = writeln!(
        output,
        "Expected number of test cases with mismatches: {:.6}",
        report.expected_mismatch_count
    );

    output
}

/// Before/after byte totals, their difference and ratio
pub fn format_sizes(sizes: &SizeComparison) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Size before:  {} bytes", sizes.before);
    let _ = writeln!(output, "Size after:   {} bytes", sizes.after);
    let _ = writeln!(output, "Difference:   {} bytes", sizes.diff);
    if let Some(factor) = sizes.factor {
        let _ = writeln!(output, "Factor of:    {:.6}", factor);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfcmp_logic::{LabelMismatch, ResultsMap, compare_results, compare_sizes};
    use perfcmp_stats::{DEFAULT_ALPHA, compute_sample_statistics};

    fn results(entries: &[(&str, &[f64])]) -> ResultsMap {
        entries
            .iter()
            .map(|(label, values)| {
                (
                    label.to_string(),
                    compute_sample_statistics(values, DEFAULT_ALPHA).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_format_table_alignment() {
        let rows = vec![
            vec!["a".to_string(), "1".to_string()],
            vec!["longer".to_string(), "22".to_string()],
        ];
        let table = format_table(&["Name", "Value"], &rows);

        assert_eq!(
            table,
            "Name    Value\n\
             ------  -----\n\
             a       1\n\
             longer  22\n"
        );
    }

    #[test]
    fn test_format_table_ragged_rows() {
        let rows = vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "2".to_string(), "extra".to_string()],
        ];
        let table = format_table(&["Name", "Value"], &rows);

        assert_eq!(
            table,
            "Name  Value\n\
             ----  -----\n\
             a     \n\
             b     2\n"
        );
    }

    #[test]
    fn test_comparison_output() {
        let before = results(&[("fast", &[98.0, 100.0, 102.0]), ("gone", &[1.0, 2.0])]);
        let after = results(&[("fast", &[128.0, 130.0, 132.0]), ("new_test", &[1.0, 2.0])]);
        let output = format_comparison(&compare_results(&before, &after));

        assert!(output.starts_with("Summary counts:\n  3 test cases in total\n"));
        assert!(output.contains("  0 test cases had no significant difference (no_sig_diff)\n"));
        assert!(output.contains("  1 test case got slower\n"));
        assert!(output.contains("  1 test case added\n"));
        assert!(output.contains("Results from test cases with differences:"));
        assert!(output.contains("100 +/- 11"));

        let new_row = output
            .lines()
            .rev()
            .find(|line| line.starts_with("new_test"))
            .unwrap();
        let cells: Vec<_> = new_row.split_whitespace().collect();
        assert_eq!(cells[1], "added");
        assert_eq!(cells[2], "-");
        assert_eq!(cells[3], "-");
    }

    #[test]
    fn test_no_differences_section_omitted() {
        let before = results(&[("t", &[98.0, 100.0, 102.0])]);
        let after = results(&[("t", &[99.0, 100.0, 101.0])]);
        let output = format_comparison(&compare_results(&before, &after));

        assert!(!output.contains("with differences"));
        assert!(output.contains("Results from all test cases:"));
    }

    #[test]
    fn test_validation_output() {
        let report = ValidationReport {
            test_cases: vec![LabelMismatch {
                label: "a".to_string(),
                mismatch_rate: 0.25,
                group_count: 4,
            }],
            mean_mismatch_rate: 0.25,
            mean_relative_ci_width: 0.1,
            expected_mismatch_count: 0.25,
            group_count: 4,
            group_size: 2,
            boot_count: 9,
            leftover_boots: 1,
        };
        let output = format_validation(&report);

        assert!(output.contains("0.250000 a\n"));
        assert!(output.contains("Mean mismatch rate: 0.250000\n"));
        assert!(output.contains("Number of test cases: 1\n"));
        assert!(output.contains("4 groups of 2 boots each (ignoring 1 leftover boots)"));
    }

    #[test]
    fn test_sizes_output() {
        assert_eq!(
            format_sizes(&compare_sizes(200, 100)),
            "Size before:  200 bytes\n\
             Size after:   100 bytes\n\
             Difference:   -100 bytes\n\
             Factor of:    0.500000\n"
        );
        assert!(!format_sizes(&compare_sizes(0, 100)).contains("Factor"));
    }
}
