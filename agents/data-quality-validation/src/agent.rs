//! End-to-end validation of a dataset file
//!
//! Loads the dataset, runs the validator, formats the report, records the
//! run in the audit trail and updates metrics.

use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use audit_trail::{AuditEntry, AuditTrail, NewEntry};

use crate::config::ValidatorConfig;
use crate::dataset::DatasetLoader;
use crate::engine::DataQualityValidator;
use crate::error::{Result, ValidationError};
use crate::report::{format_report, FormattedReport, ValidationReport};
use crate::telemetry::QualityMetricsRegistry;
use crate::trace::{ExecutionTrace, TraceStep};

pub const RAW_REPORT_FILE: &str = "validation_report_raw.json";
pub const FORMATTED_REPORT_FILE: &str = "validation_report_formatted.json";
pub const VALIDATION_ACTION: &str = "validation";
/// Trace step recorded when the dataset cannot be loaded
pub const LOAD_STEP: &str = "load-dataset";

/// Everything produced by one validation run
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub dataset: PathBuf,
    pub report: ValidationReport,
    pub formatted: FormattedReport,
    pub trace: ExecutionTrace,
    /// Entry appended to the audit trail, if auditing is enabled
    pub audit_entry: Option<AuditEntry>,
}

/// Loader, validator and optional audit and metrics sinks
pub struct DataQualityAgent {
    loader: DatasetLoader,
    validator: DataQualityValidator,
    audit: Option<AuditTrail>,
    metrics: Option<QualityMetricsRegistry>,
}

impl DataQualityAgent {
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let loader = DatasetLoader::new(config.na_values.as_slice());
        let validator = DataQualityValidator::new(config)?;
        Ok(Self {
            loader,
            validator,
            audit: None,
            metrics: None,
        })
    }

    /// Record every run in `trail`
    pub fn with_audit(mut self, trail: AuditTrail) -> Self {
        self.audit = Some(trail);
        self
    }

    pub fn with_metrics(mut self, metrics: QualityMetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn validator(&self) -> &DataQualityValidator {
        &self.validator
    }

    pub fn audit(&self) -> Option<&AuditTrail> {
        self.audit.as_ref()
    }

    pub fn metrics(&self) -> Option<&QualityMetricsRegistry> {
        self.metrics.as_ref()
    }

    /// Load and validate the dataset at `path`
    pub fn validate_path(&self, path: &Path) -> Result<ValidationOutcome> {
        let timer = self.metrics.as_ref().map(|m| m.quality().start_timer());

        let dataset = match self.loader.load_path(path) {
            Ok(dataset) => dataset,
            Err(e) => {
                self.record_load_failure(path, &e);
                return Err(e);
            }
        };
        info!(
            dataset = %path.display(),
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "Dataset loaded"
        );

        let (report, trace) = self.validator.run_traced(&dataset);
        let formatted = format_report(&report);
        drop(timer);

        if let Some(metrics) = &self.metrics {
            metrics.quality().record_report(&report);
        }

        let audit_entry = match &self.audit {
            Some(trail) => Some(self.record_run(trail, path, &report, &trace)?),
            None => None,
        };

        Ok(ValidationOutcome {
            dataset: path.to_path_buf(),
            report,
            formatted,
            trace,
            audit_entry,
        })
    }

    fn run_inputs(&self, path: &Path) -> serde_json::Value {
        let config = self.validator.config();
        json!({
            "dataset": path.display().to_string(),
            "thresholds": {
                "missing_warn_threshold": config.missing_warn_threshold,
                "missing_critical_threshold": config.missing_critical_threshold,
                "outlier_iqr_multiplier": config.outlier_iqr_multiplier,
            },
        })
    }

    fn record_run(
        &self,
        trail: &AuditTrail,
        path: &Path,
        report: &ValidationReport,
        trace: &ExecutionTrace,
    ) -> Result<AuditEntry> {
        let entry = NewEntry::new(crate::AGENT_NAME, VALIDATION_ACTION)
            .with_inputs(self.run_inputs(path))
            .with_outputs(json!({
                "severity": report.severity,
                "blocking_issues": report.blocking_issues,
            }))
            .with_notes(report.summary())
            .with_reasoning(trace.to_reasoning());

        self.append(trail, entry)
    }

    /// Audit a run that stopped before any rule could evaluate
    ///
    /// The load error is what the caller sees; a failure to append is only
    /// logged.
    fn record_load_failure(&self, path: &Path, cause: &ValidationError) {
        let Some(trail) = &self.audit else {
            return;
        };

        let mut trace = ExecutionTrace::start(crate::AGENT_NAME);
        let mut step = TraceStep::start(LOAD_STEP);
        step.fail(cause.to_string());
        trace.add_step(step);
        trace.fail(cause.to_string());

        let entry = NewEntry::new(crate::AGENT_NAME, VALIDATION_ACTION)
            .with_inputs(self.run_inputs(path))
            .with_outputs(json!({
                "status": trace.status,
                "error": trace.error,
            }))
            .with_notes(format!("Validation failed: {}", cause))
            .with_reasoning(trace.to_reasoning());

        if let Err(e) = self.append(trail, entry) {
            warn!(error = %e, dataset = %path.display(), "Failed run was not audited");
        }
    }

    fn append(&self, trail: &AuditTrail, entry: NewEntry) -> Result<AuditEntry> {
        match trail.record(entry) {
            Ok(entry) => {
                if let Some(metrics) = &self.metrics {
                    metrics.quality().record_audit_appended();
                }
                Ok(entry)
            }
            Err(e) => {
                error!(error = %e, path = %trail.path().display(), "Failed to record validation run");
                if let Some(metrics) = &self.metrics {
                    metrics.quality().record_audit_failed();
                }
                Err(e.into())
            }
        }
    }
}

/// Write the raw and formatted reports as pretty JSON into `dir`
pub fn write_reports(outcome: &ValidationOutcome, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ValidationError::file_error(format!("Cannot create {}: {}", dir.display(), e))
    })?;

    let raw_path = dir.join(RAW_REPORT_FILE);
    let formatted_path = dir.join(FORMATTED_REPORT_FILE);
    write_json(&raw_path, &outcome.report)?;
    write_json(&formatted_path, &outcome.formatted)?;

    info!(
        raw = %raw_path.display(),
        formatted = %formatted_path.display(),
        "Reports written"
    );
    Ok((raw_path, formatted_path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ValidationError::SerializationError(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| ValidationError::file_error(format!("Cannot write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::Severity;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_without_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "clean.csv", "a,b\n1,x\n2,y\n3,z\n");

        let agent = DataQualityAgent::new(ValidatorConfig::default()).unwrap();
        let outcome = agent.validate_path(&path).unwrap();

        assert_eq!(outcome.report.severity, Severity::Low);
        assert_eq!(outcome.formatted.dataset_overview.rows, 3);
        assert!(outcome.audit_entry.is_none());
        assert_eq!(outcome.trace.steps.len(), 3);
    }

    #[test]
    fn test_validate_records_audit_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "gaps.csv", "x\n1\nNA\n3\nNA\n");
        let trail = AuditTrail::open(dir.path().join("audit.jsonl")).unwrap();

        let agent = DataQualityAgent::new(ValidatorConfig::default())
            .unwrap()
            .with_audit(trail)
            .with_metrics(QualityMetricsRegistry::new().unwrap());
        let outcome = agent.validate_path(&path).unwrap();

        let entry = outcome.audit_entry.unwrap();
        assert_eq!(entry.agent_name, "DataQualityValidator");
        assert_eq!(entry.action_type, "validation");
        assert_eq!(entry.sequence, 1);
        assert_eq!(entry.outputs["severity"], "HIGH");
        assert_eq!(
            entry.outputs["blocking_issues"][0],
            "Column 'x' missing 50.0% of values"
        );
        assert_eq!(
            entry.inputs["thresholds"]["missing_critical_threshold"],
            0.3
        );
        assert_eq!(entry.reasoning.len(), 3);

        let text = agent.metrics().unwrap().encode_text().unwrap();
        assert!(text.contains("data_quality_audit_entries_appended_total 1"));
    }

    #[test]
    fn test_missing_dataset_is_file_error() {
        let agent = DataQualityAgent::new(ValidatorConfig::default()).unwrap();
        let err = agent
            .validate_path(Path::new("/nonexistent/data.csv"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileError(_)));
    }

    #[test]
    fn test_failed_load_is_audited() {
        let dir = tempfile::tempdir().unwrap();
        let trail = AuditTrail::open(dir.path().join("audit.jsonl")).unwrap();
        let agent = DataQualityAgent::new(ValidatorConfig::default())
            .unwrap()
            .with_audit(trail)
            .with_metrics(QualityMetricsRegistry::new().unwrap());

        let missing = dir.path().join("absent.csv");
        let err = agent.validate_path(&missing).unwrap_err();
        assert!(matches!(err, ValidationError::FileError(_)));

        let entries = agent.audit().unwrap().entries().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.action_type, "validation");
        assert_eq!(entry.outputs["status"], "failed");
        assert_eq!(entry.outputs["error"], err.to_string());
        assert!(entry.inputs["dataset"].as_str().unwrap().ends_with("absent.csv"));
        assert!(entry.notes.as_deref().unwrap().starts_with("Validation failed: "));
        assert_eq!(entry.reasoning.len(), 1);
        assert_eq!(entry.reasoning[0].check, LOAD_STEP);
        assert_eq!(entry.reasoning[0].conclusion, err.to_string());
        assert!(agent.audit().unwrap().verify().unwrap().valid);

        let text = agent.metrics().unwrap().encode_text().unwrap();
        assert!(text.contains("data_quality_audit_entries_appended_total 1"));
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "clean.csv", "a\n1\n2\n");
        let agent = DataQualityAgent::new(ValidatorConfig::default()).unwrap();
        let outcome = agent.validate_path(&path).unwrap();

        let out = dir.path().join("reports");
        let (raw, formatted) = write_reports(&outcome, &out).unwrap();

        let raw_json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(raw).unwrap()).unwrap();
        assert_eq!(raw_json["severity"], "LOW");
        let formatted_json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(formatted).unwrap()).unwrap();
        assert_eq!(
            formatted_json["status"]["summary"],
            "Dataset meets all quality checks."
        );
    }
}
