//! Missing-value detection
//!
//! Flags every column containing at least one null. Columns whose missing
//! ratio reaches the critical threshold are blocking.

use super::{round4, QualityIssue, ReportSection, Rule, RuleCategory, RuleOutcome, Severity};
use crate::dataset::Dataset;
use crate::report::MissingValueStat;

/// Rule measuring the fraction of missing cells per column
pub struct MissingValuesRule {
    warn_threshold: f64,
    critical_threshold: f64,
}

impl MissingValuesRule {
    pub const ID: &'static str = "missing-values";

    pub fn new(warn_threshold: f64, critical_threshold: f64) -> Self {
        Self {
            warn_threshold,
            critical_threshold,
        }
    }

    /// Severity of a single column's missing ratio
    pub fn classify(&self, ratio: f64) -> Severity {
        if ratio >= self.critical_threshold {
            Severity::High
        } else if ratio >= self.warn_threshold {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Message used for a column above the critical threshold
pub fn blocking_message(column: &str, ratio: f64) -> String {
    format!("Column '{}' missing {:.1}% of values", column, ratio * 100.0)
}

impl Rule for MissingValuesRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Missing values"
    }

    fn description(&self) -> &str {
        "Measures the fraction of missing cells in each column"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Missing
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleOutcome {
        let rows = dataset.num_rows();
        let mut stats = Vec::new();
        let mut issues = Vec::new();

        for column in dataset.columns() {
            let missing = column.null_count();
            if missing == 0 || rows == 0 {
                continue;
            }

            let ratio = round4(missing as f64 / rows as f64);
            let severity = self.classify(ratio);
            let message = if severity == Severity::High {
                blocking_message(&column.name, ratio)
            } else {
                format!(
                    "{} of {} values missing ({:.1}%)",
                    missing,
                    rows,
                    ratio * 100.0
                )
            };

            issues.push(QualityIssue::new(
                Self::ID,
                RuleCategory::Missing,
                severity,
                &column.name,
                message,
            ));
            stats.push(MissingValueStat {
                column: column.name.clone(),
                missing_count: missing,
                ratio,
            });
        }

        RuleOutcome {
            issues,
            section: ReportSection::MissingValues(stats),
        }
    }
}
