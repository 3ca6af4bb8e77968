//! Presentation view of a validation report

use serde::{Deserialize, Serialize};

use super::{AnomalyStat, MissingValueStat, TypeIssue, ValidationReport};
use crate::engine::rules::outliers::IQR_METHOD;
use crate::engine::rules::Severity;

pub const SUMMARY_HIGH: &str =
    "Critical data quality issues detected. Dataset is not safe for modeling.";
pub const SUMMARY_MEDIUM: &str = "Dataset is usable with minor anomalies that should be reviewed.";
pub const SUMMARY_LOW: &str = "Dataset meets all quality checks.";

pub const ANOMALIES_FOUND: &str = "Minor statistical outliers detected";
pub const NO_ANOMALIES: &str = "No anomalies detected";

pub const RECOMMEND_RESOLVE: &str = "Resolve blocking data quality issues before modeling.";
pub const RECOMMEND_PROCEED: &str = "Proceed with downstream modeling.";
pub const RECOMMEND_REVIEW_ANOMALIES: &str =
    "Review anomaly-prone numerical features for business validity.";
pub const RECOMMEND_NO_MISSING: &str = "No missing-value preprocessing required.";
pub const RECOMMEND_NO_TYPE_FIXES: &str = "No schema or type corrections needed.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatus {
    pub severity: Severity,
    pub blocking: bool,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValuesSection {
    pub columns_with_missing: usize,
    pub details: Vec<MissingValueStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeIssuesSection {
    pub count: usize,
    pub details: Vec<TypeIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualitySection {
    pub missing_values: MissingValuesSection,
    pub type_issues: TypeIssuesSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAnalysis {
    pub method: String,
    pub summary: String,
    pub details: Vec<AnomalyStat>,
}

/// Human-oriented report derived from a [`ValidationReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedReport {
    pub status: ReportStatus,
    pub dataset_overview: DatasetOverview,
    pub data_quality: DataQualitySection,
    pub anomaly_analysis: AnomalyAnalysis,
    pub blocking_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Build the presentation view of a raw report
pub fn format_report(report: &ValidationReport) -> FormattedReport {
    let summary = match report.severity {
        Severity::High => SUMMARY_HIGH,
        Severity::Medium => SUMMARY_MEDIUM,
        Severity::Low => SUMMARY_LOW,
    };

    let anomaly_summary = if report.anomalies.is_empty() {
        NO_ANOMALIES
    } else {
        ANOMALIES_FOUND
    };

    FormattedReport {
        status: ReportStatus {
            severity: report.severity,
            blocking: report.is_blocking(),
            summary: summary.to_string(),
        },
        dataset_overview: DatasetOverview {
            rows: report.dataset_summary.num_rows,
            columns: report.dataset_summary.num_columns,
            column_names: report.dataset_summary.columns.clone(),
        },
        data_quality: DataQualitySection {
            missing_values: MissingValuesSection {
                columns_with_missing: report.missing_values.len(),
                details: report.missing_values.clone(),
            },
            type_issues: TypeIssuesSection {
                count: report.type_issues.len(),
                details: report.type_issues.clone(),
            },
        },
        anomaly_analysis: AnomalyAnalysis {
            method: IQR_METHOD.to_string(),
            summary: anomaly_summary.to_string(),
            details: report.anomalies.clone(),
        },
        blocking_issues: report.blocking_issues.clone(),
        recommendations: recommendations(report),
    }
}

fn recommendations(report: &ValidationReport) -> Vec<String> {
    let mut out = Vec::new();

    if report.is_blocking() {
        out.push(RECOMMEND_RESOLVE.to_string());
    } else {
        out.push(RECOMMEND_PROCEED.to_string());
    }
    if !report.anomalies.is_empty() {
        out.push(RECOMMEND_REVIEW_ANOMALIES.to_string());
    }
    if report.missing_values.is_empty() {
        out.push(RECOMMEND_NO_MISSING.to_string());
    }
    if report.type_issues.is_empty() {
        out.push(RECOMMEND_NO_TYPE_FIXES.to_string());
    }

    out
}
