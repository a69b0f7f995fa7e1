//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReportBody, ReportMeta};
    use perfcmp_logic::compare_sizes;

    #[test]
    fn test_json_is_tagged_by_kind() {
        let report = Report::new(
            ReportMeta::new(None, None),
            ReportBody::CompareSizes(compare_sizes(100, 150)),
        );
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["result"]["kind"], "compare_sizes");
        assert_eq!(value["result"]["diff"], 50);
        assert_eq!(value["result"]["factor"], 1.5);
        assert_eq!(value["meta"]["schema_version"], 1);
        assert!(value["meta"]["alpha"].is_null());
    }
}
