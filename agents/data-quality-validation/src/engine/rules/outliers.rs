//! IQR-based outlier detection
//!
//! For each fully numeric column, quartiles are computed with linear
//! interpolation between closest ranks. Values strictly outside
//! `[Q1 - k*IQR, Q3 + k*IQR]` are outliers.

use super::{round4, QualityIssue, ReportSection, Rule, RuleCategory, RuleOutcome, Severity};
use crate::dataset::{Column, Dataset};
use crate::report::AnomalyStat;

/// Name of the detection method recorded in reports
pub const IQR_METHOD: &str = "IQR";

/// Quantile of an ascending slice with linear interpolation
///
/// Returns `None` for an empty slice. `q` is clamped to `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Rule counting values outside the IQR fences
pub struct IqrOutlierRule {
    multiplier: f64,
}

impl IqrOutlierRule {
    pub const ID: &'static str = "iqr-outliers";

    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Inspect a single column; non-numeric columns are skipped
    pub fn check_column(&self, column: &Column) -> Option<AnomalyStat> {
        if !column.column_type().is_numeric() {
            return None;
        }

        let mut values = column.numeric_values();
        values.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&values, 0.25)?;
        let q3 = quantile(&values, 0.75)?;
        let iqr = q3 - q1;
        let lower_bound = q1 - self.multiplier * iqr;
        let upper_bound = q3 + self.multiplier * iqr;

        let count = values
            .iter()
            .filter(|v| **v < lower_bound || **v > upper_bound)
            .count();

        if count == 0 {
            return None;
        }

        Some(AnomalyStat {
            column: column.name.clone(),
            method: IQR_METHOD.to_string(),
            count,
            percentage: round4(count as f64 / values.len() as f64),
            lower_bound,
            upper_bound,
        })
    }
}

impl Rule for IqrOutlierRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> &str {
        "IQR outliers"
    }

    fn description(&self) -> &str {
        "Counts numeric values outside the interquartile-range fences"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Anomaly
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleOutcome {
        let anomalies: Vec<AnomalyStat> = dataset
            .columns()
            .iter()
            .filter_map(|column| self.check_column(column))
            .collect();

        let issues = anomalies
            .iter()
            .map(|stat| {
                QualityIssue::new(
                    Self::ID,
                    RuleCategory::Anomaly,
                    Severity::Medium,
                    &stat.column,
                    format!(
                        "{} outlier(s) outside [{}, {}] ({:.2}% of values)",
                        stat.count,
                        stat.lower_bound,
                        stat.upper_bound,
                        stat.percentage * 100.0
                    ),
                )
            })
            .collect();

        RuleOutcome {
            issues,
            section: ReportSection::Anomalies(anomalies),
        }
    }
}
