//! Validation report structures
//!
//! [`ValidationReport`] is the raw, machine-oriented output of a run.
//! [`format::FormattedReport`] is the presentation view derived from it.

pub mod format;

pub use format::{format_report, FormattedReport};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::rules::{QualityIssue, Severity};

/// Blocking message used when there is nothing to validate
pub const EMPTY_DATASET_ISSUE: &str = "Dataset is empty";

/// Shape of the validated dataset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<String>,
}

/// Missing-value statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueStat {
    pub column: String,
    pub missing_count: usize,
    /// Fraction of rows that are missing, rounded to 4 decimals
    pub ratio: f64,
}

/// Kind of type inconsistency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeIssueKind {
    /// Mostly numeric column with stray non-numeric values
    NonNumericInNumeric,
    /// Several unrelated value kinds in one column
    MixedTypes,
}

impl TypeIssueKind {
    pub fn message(&self) -> &'static str {
        match self {
            TypeIssueKind::NonNumericInNumeric => "Numeric column contains non-numeric values",
            TypeIssueKind::MixedTypes => "Mixed data types in column",
        }
    }
}

impl fmt::Display for TypeIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Type inconsistency found in one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeIssue {
    pub column: String,
    pub kind: TypeIssueKind,
    pub message: String,
    /// Cells that do not match the column's dominant kind
    pub offending_count: usize,
}

/// Outliers detected in one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStat {
    pub column: String,
    pub method: String,
    pub count: usize,
    /// Fraction of non-null values that are outliers, rounded to 4 decimals
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Raw output of a validation run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub dataset_summary: DatasetSummary,
    pub missing_values: Vec<MissingValueStat>,
    pub type_issues: Vec<TypeIssue>,
    pub anomalies: Vec<AnomalyStat>,
    /// Every flagged issue with its own severity
    pub issues: Vec<QualityIssue>,
    pub severity: Severity,
    pub blocking_issues: Vec<String>,
}

impl ValidationReport {
    /// Report for a dataset with no rows or no columns
    pub fn empty_dataset() -> Self {
        Self {
            severity: Severity::High,
            blocking_issues: vec![EMPTY_DATASET_ISSUE.to_string()],
            ..Default::default()
        }
    }

    /// Whether any blocking issue was found
    pub fn is_blocking(&self) -> bool {
        !self.blocking_issues.is_empty()
    }

    /// One-line summary for logs and audit notes
    pub fn summary(&self) -> String {
        format!(
            "severity={}, rows={}, columns={}, missing={}, type_issues={}, anomalies={}, blocking={}",
            self.severity,
            self.dataset_summary.num_rows,
            self.dataset_summary.num_columns,
            self.missing_values.len(),
            self.type_issues.len(),
            self.anomalies.len(),
            self.blocking_issues.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset_report() {
        let report = ValidationReport::empty_dataset();
        assert_eq!(report.severity, Severity::High);
        assert_eq!(report.blocking_issues, vec!["Dataset is empty"]);
        assert_eq!(report.dataset_summary.num_rows, 0);
        assert!(report.dataset_summary.columns.is_empty());
        assert!(report.is_blocking());
    }

    #[test]
    fn test_report_json_shape() {
        let report = ValidationReport::empty_dataset();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["severity"], "HIGH");
        assert_eq!(json["dataset_summary"]["num_columns"], 0);
        assert!(json["missing_values"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_type_issue_kind_messages() {
        assert_eq!(
            TypeIssueKind::NonNumericInNumeric.to_string(),
            "Numeric column contains non-numeric values"
        );
        assert_eq!(TypeIssueKind::MixedTypes.message(), "Mixed data types in column");
    }
}
