//! Validation engine for the Data Quality Validation Agent
//!
//! Runs the registered rules over a dataset and folds their outcomes into a
//! [`ValidationReport`] with an overall severity and blocking issues.

pub mod rules;

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ValidatorConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::report::{DatasetSummary, ValidationReport};
use crate::trace::{ExecutionTrace, TraceStep};
use rules::missing::{blocking_message, MissingValuesRule};
use rules::outliers::IqrOutlierRule;
use rules::type_check::TypeConsistencyRule;
use rules::{ReportSection, Rule, Severity};

/// Orchestrates rule evaluation against a dataset
pub struct DataQualityValidator {
    config: ValidatorConfig,
    rules: Vec<Arc<dyn Rule>>,
}

impl DataQualityValidator {
    /// Create a validator with the default rule set
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let mut validator = Self::empty(config)?;
        validator.register_default_rules();
        Ok(validator)
    }

    /// Create a validator with no rules registered
    pub fn empty(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rules: Vec::new(),
        })
    }

    fn register_default_rules(&mut self) {
        self.register(Arc::new(MissingValuesRule::new(
            self.config.missing_warn_threshold,
            self.config.missing_critical_threshold,
        )));
        self.register(Arc::new(TypeConsistencyRule::new()));
        self.register(Arc::new(IqrOutlierRule::new(
            self.config.outlier_iqr_multiplier,
        )));
    }

    /// Register an additional rule
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a dataset
    ///
    /// Deterministic: the same dataset and configuration always yield the
    /// same report. The dataset is never modified.
    pub fn run(&self, dataset: &Dataset) -> ValidationReport {
        self.run_traced(dataset).0
    }

    /// Validate a dataset and record one trace step per rule
    pub fn run_traced(&self, dataset: &Dataset) -> (ValidationReport, ExecutionTrace) {
        let start = Instant::now();
        let mut trace = ExecutionTrace::start(crate::AGENT_NAME);

        if dataset.is_empty() {
            warn!(
                rows = dataset.num_rows(),
                columns = dataset.num_columns(),
                "Dataset is empty, skipping rules"
            );
            trace.complete();
            return (ValidationReport::empty_dataset(), trace);
        }

        let mut report = ValidationReport {
            dataset_summary: DatasetSummary {
                num_rows: dataset.num_rows(),
                num_columns: dataset.num_columns(),
                columns: dataset.column_names(),
            },
            ..Default::default()
        };

        for rule in &self.rules {
            let mut step = TraceStep::start(rule.id());
            let outcome = rule.evaluate(dataset);

            debug!(
                rule_id = rule.id(),
                category = %rule.category(),
                flagged = outcome.section.len(),
                "Rule evaluated"
            );

            let conclusion = if outcome.section.is_empty() {
                format!("{}: nothing flagged", rule.name())
            } else {
                format!("{}: {} column(s) flagged", rule.name(), outcome.section.len())
            };
            step.complete(conclusion, outcome.section.to_json());
            trace.add_step(step);

            report.issues.extend(outcome.issues);
            match outcome.section {
                ReportSection::MissingValues(stats) => report.missing_values.extend(stats),
                ReportSection::TypeIssues(issues) => report.type_issues.extend(issues),
                ReportSection::Anomalies(stats) => report.anomalies.extend(stats),
            }
        }

        self.assign_severity(&mut report);
        trace.complete();

        info!(
            severity = %report.severity,
            rows = report.dataset_summary.num_rows,
            columns = report.dataset_summary.num_columns,
            missing = report.missing_values.len(),
            type_issues = report.type_issues.len(),
            anomalies = report.anomalies.len(),
            blocking = report.blocking_issues.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Validation completed"
        );

        (report, trace)
    }

    fn assign_severity(&self, report: &mut ValidationReport) {
        let critical = self.config.missing_critical_threshold;

        report.blocking_issues = report
            .missing_values
            .iter()
            .filter(|stat| stat.ratio >= critical)
            .map(|stat| blocking_message(&stat.column, stat.ratio))
            .collect();

        // Sub-critical missingness only shows up in the per-issue severities.
        report.severity = if !report.blocking_issues.is_empty() {
            Severity::High
        } else if !report.type_issues.is_empty() || !report.anomalies.is_empty() {
            Severity::Medium
        } else {
            Severity::Low
        };
    }
}
