//! Rule framework for dataset validation
//!
//! Each rule inspects a [`Dataset`] and returns an outcome: the flagged
//! issues plus the typed statistics that make up its section of the report.

pub mod missing;
pub mod outliers;
pub mod type_check;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::Dataset;
use crate::report::{AnomalyStat, MissingValueStat, TypeIssue};

/// Categories of validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Missing-value detection
    Missing,
    /// Type consistency within a column
    Type,
    /// Statistical anomalies in numeric columns
    Anomaly,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Missing => "missing",
            RuleCategory::Type => "type",
            RuleCategory::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of an issue and of a whole report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Dataset can be used as is
    Low,
    /// Usable, but should be reviewed
    Medium,
    /// Not safe for downstream use
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single flagged issue: what kind, where, and how severe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// Rule that raised the issue
    pub rule_id: String,
    /// Category of the rule
    pub category: RuleCategory,
    /// Severity of this issue on its own
    pub severity: Severity,
    /// Column the issue was found in
    pub column: String,
    /// Human-readable description
    pub message: String,
}

impl QualityIssue {
    pub fn new(
        rule_id: impl Into<String>,
        category: RuleCategory,
        severity: Severity,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            category,
            severity,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Whether this issue alone forces the report to HIGH
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::High
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at '{}': {}",
            self.severity, self.rule_id, self.column, self.message
        )
    }
}

/// Typed statistics a rule contributes to the report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSection {
    MissingValues(Vec<MissingValueStat>),
    TypeIssues(Vec<TypeIssue>),
    Anomalies(Vec<AnomalyStat>),
}

impl ReportSection {
    /// Number of columns flagged in this section
    pub fn len(&self) -> usize {
        match self {
            ReportSection::MissingValues(stats) => stats.len(),
            ReportSection::TypeIssues(issues) => issues.len(),
            ReportSection::Anomalies(stats) => stats.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON view of the section, used as trace artifact
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            ReportSection::MissingValues(stats) => serde_json::to_value(stats),
            ReportSection::TypeIssues(issues) => serde_json::to_value(issues),
            ReportSection::Anomalies(stats) => serde_json::to_value(stats),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub issues: Vec<QualityIssue>,
    pub section: ReportSection,
}

/// Trait for implementing dataset validation rules
///
/// Rules are deterministic and never modify the dataset. Each rule covers
/// one aspect of data quality.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &str;

    /// Human-readable name for this rule
    fn name(&self) -> &str;

    /// Description of what this rule validates
    fn description(&self) -> &str;

    /// Category this rule belongs to
    fn category(&self) -> RuleCategory;

    /// Evaluate the rule against a non-empty dataset
    fn evaluate(&self, dataset: &Dataset) -> RuleOutcome;
}

/// Round to four decimal places, the precision used throughout reports
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
