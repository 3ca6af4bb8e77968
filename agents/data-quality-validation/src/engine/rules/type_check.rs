//! Type consistency checks
//!
//! A column is expected to hold one kind of value. Two situations are
//! flagged: a mostly numeric column with stray non-numeric cells (typically
//! unrecognized missing-value markers such as `?`), and a column mixing
//! several kinds without a numeric majority.

use std::collections::BTreeMap;

use super::{QualityIssue, ReportSection, Rule, RuleCategory, RuleOutcome, Severity};
use crate::dataset::{CellKind, Column, Dataset};
use crate::report::{TypeIssue, TypeIssueKind};

/// Rule detecting inconsistent value kinds within a column
pub struct TypeConsistencyRule;

impl TypeConsistencyRule {
    pub const ID: &'static str = "type-consistency";

    pub fn new() -> Self {
        Self
    }

    /// Inspect a single column
    pub fn check_column(&self, column: &Column) -> Option<TypeIssue> {
        let mut counts: BTreeMap<CellKind, usize> = BTreeMap::new();
        for kind in column.non_null().filter_map(|v| v.kind()) {
            *counts.entry(kind).or_insert(0) += 1;
        }

        let total: usize = counts.values().sum();
        if total == 0 || counts.len() < 2 {
            return None;
        }

        let numeric = counts.get(&CellKind::Number).copied().unwrap_or(0);
        let (kind, offending_count) = if numeric * 2 > total {
            (TypeIssueKind::NonNumericInNumeric, total - numeric)
        } else {
            let dominant = counts.values().copied().max().unwrap_or(0);
            (TypeIssueKind::MixedTypes, total - dominant)
        };

        Some(TypeIssue {
            column: column.name.clone(),
            kind,
            message: kind.message().to_string(),
            offending_count,
        })
    }
}

impl Default for TypeConsistencyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TypeConsistencyRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "Type consistency"
    }

    fn description(&self) -> &str {
        "Detects non-numeric values in numeric columns and mixed value kinds"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Type
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleOutcome {
        let type_issues: Vec<TypeIssue> = dataset
            .columns()
            .iter()
            .filter_map(|column| self.check_column(column))
            .collect();

        let issues = type_issues
            .iter()
            .map(|issue| {
                QualityIssue::new(
                    Self::ID,
                    RuleCategory::Type,
                    Severity::Medium,
                    &issue.column,
                    format!("{} ({} offending)", issue.message, issue.offending_count),
                )
            })
            .collect();

        RuleOutcome {
            issues,
            section: ReportSection::TypeIssues(type_issues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CellValue::*;

    #[test]
    fn test_uniform_columns_pass() {
        let rule = TypeConsistencyRule::new();
        assert!(rule
            .check_column(&Column::new("a", vec![Integer(1), Float(2.5), Null]))
            .is_none());
        assert!(rule
            .check_column(&Column::new("b", vec![Text("x".into()), Text("y".into())]))
            .is_none());
        assert!(rule.check_column(&Column::new("c", vec![Null, Null])).is_none());
    }

    #[test]
    fn test_non_numeric_in_numeric_column() {
        let rule = TypeConsistencyRule::new();
        let column = Column::new(
            "ca",
            vec![Integer(0), Integer(3), Text("?".into()), Integer(1), Null],
        );
        let issue = rule.check_column(&column).unwrap();
        assert_eq!(issue.kind, TypeIssueKind::NonNumericInNumeric);
        assert_eq!(issue.message, "Numeric column contains non-numeric values");
        assert_eq!(issue.offending_count, 1);
    }

    #[test]
    fn test_mixed_types_without_numeric_majority() {
        let rule = TypeConsistencyRule::new();
        let column = Column::new(
            "flag",
            vec![Boolean(true), Text("yes".into()), Text("no".into()), Integer(1)],
        );
        let issue = rule.check_column(&column).unwrap();
        assert_eq!(issue.kind, TypeIssueKind::MixedTypes);
        assert_eq!(issue.offending_count, 2);
    }

    #[test]
    fn test_even_split_is_mixed() {
        let rule = TypeConsistencyRule::new();
        let column = Column::new("x", vec![Integer(1), Text("a".into())]);
        assert_eq!(rule.check_column(&column).unwrap().kind, TypeIssueKind::MixedTypes);
    }

    #[test]
    fn test_evaluate_flags_medium_issues() {
        let ds = Dataset::new(vec![
            Column::new("ok", vec![Integer(1), Integer(2), Integer(3)]),
            Column::new("bad", vec![Integer(1), Integer(2), Text("?".into())]),
        ])
        .unwrap();

        let outcome = TypeConsistencyRule::new().evaluate(&ds);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].column, "bad");
        assert_eq!(outcome.issues[0].severity, Severity::Medium);
        assert_eq!(outcome.section.len(), 1);
    }
}
