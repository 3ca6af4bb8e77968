//! CLI command definitions for the Data Quality Validation Agent
//!
//! Clap-based commands for validating datasets and for logging, querying
//! and verifying the audit trail.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};

use audit_trail::{read_entries, verify_path, AuditQuery, AuditTrail};

use super::output::{
    print_structured, write_entries_table, write_report_table, write_verification_table,
    OutputFormat, ReportView,
};
use super::ExitCode;
use crate::agent::{write_reports, DataQualityAgent};
use crate::config::{AuditSettings, ConfigOverrides, ValidatorConfig};
use crate::error::{Result, ValidationError};
use crate::telemetry::{write_metrics_file, QualityMetricsRegistry};

/// Environment variable overriding the audit log location
pub const ENV_AUDIT_LOG: &str = "DQ_AUDIT_LOG";

/// Data Quality Validation Agent CLI
///
/// Validate tabular datasets for missing values, type inconsistencies and
/// statistical outliers, and inspect the audit trail of agent actions.
#[derive(Parser, Debug)]
#[command(name = "dq-validate")]
#[command(about = "Data Quality Validation Agent - Validate datasets and audit agent actions", long_about = None)]
#[command(version)]
pub struct DqCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: DqCommands,
}

/// Log output formats
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum DqCommands {
    /// Validate a dataset
    ///
    /// Loads a CSV, TSV, JSON, JSON Lines or YAML dataset, checks it and
    /// prints the report. The run is appended to the audit trail unless
    /// --no-audit is given.
    Validate(ValidateArgs),

    /// Work with the audit trail
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
}

/// Arguments of the validate command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the dataset file
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Additional token treated as a missing value (repeatable)
    #[arg(long = "na-value")]
    pub na_values: Vec<String>,

    /// Missing ratio flagged as a warning
    #[arg(long)]
    pub missing_warn: Option<f64>,

    /// Missing ratio that blocks the dataset
    #[arg(long)]
    pub missing_critical: Option<f64>,

    /// IQR fence multiplier for outlier detection
    #[arg(long)]
    pub iqr_multiplier: Option<f64>,

    /// Report view printed in JSON or YAML output
    #[arg(long, value_enum, default_value = "formatted")]
    pub report: ReportView,

    /// Output format for the report
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Directory receiving validation_report_raw.json and validation_report_formatted.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Audit log file
    #[arg(long, env = ENV_AUDIT_LOG, default_value = AuditTrail::DEFAULT_PATH)]
    pub audit_log: PathBuf,

    /// Do not record this run in the audit trail
    #[arg(long)]
    pub no_audit: bool,

    /// Write Prometheus metrics to this file
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,
}

/// Audit trail commands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// Append an action to the audit trail
    Log {
        /// Name of the acting agent
        #[arg(long)]
        agent: String,

        /// Type of action performed
        #[arg(long)]
        action: String,

        /// Inputs as a JSON document
        #[arg(long)]
        inputs: Option<String>,

        /// Outputs as a JSON document
        #[arg(long)]
        outputs: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Audit log file
        #[arg(long, env = ENV_AUDIT_LOG, default_value = AuditTrail::DEFAULT_PATH)]
        audit_log: PathBuf,

        /// Output format for the recorded entry
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Query recorded actions
    Query {
        /// Only entries of this agent
        #[arg(long)]
        agent: Option<String>,

        /// Only entries of this action type
        #[arg(long)]
        action: Option<String>,

        /// Only entries at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<DateTime<Utc>>,

        /// Only entries at or before this RFC 3339 timestamp
        #[arg(long)]
        until: Option<DateTime<Utc>>,

        /// Only entries whose notes match this regular expression
        #[arg(long)]
        notes_match: Option<String>,

        /// Keep only the most recent N matching entries
        #[arg(long)]
        limit: Option<usize>,

        /// Audit log file
        #[arg(long, env = ENV_AUDIT_LOG, default_value = AuditTrail::DEFAULT_PATH)]
        audit_log: PathBuf,

        /// Output format for matching entries
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Verify the hash chain of the audit trail
    Verify {
        /// Audit log file
        #[arg(long, env = ENV_AUDIT_LOG, default_value = AuditTrail::DEFAULT_PATH)]
        audit_log: PathBuf,

        /// Output format for the verification report
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

impl ValidateArgs {
    /// Minimal arguments for validating `dataset` with defaults
    pub fn for_dataset(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            config: None,
            na_values: Vec::new(),
            missing_warn: None,
            missing_critical: None,
            iqr_multiplier: None,
            report: ReportView::Formatted,
            format: OutputFormat::Json,
            output_dir: None,
            audit_log: PathBuf::from(AuditTrail::DEFAULT_PATH),
            no_audit: true,
            metrics_file: None,
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            missing_warn_threshold: self.missing_warn,
            missing_critical_threshold: self.missing_critical,
            outlier_iqr_multiplier: self.iqr_multiplier,
            na_values: None,
        }
    }

    /// Layer defaults, environment, config file and flags
    pub fn resolve_config(&self, env: &ConfigOverrides) -> Result<ValidatorConfig> {
        let mut config = ValidatorConfig::default();
        config.apply(env);
        if let Some(path) = &self.config {
            config.apply(&ConfigOverrides::from_file(path)?);
        }
        config.apply(&self.overrides());
        config.na_values.extend(self.na_values.iter().cloned());
        config.validate()?;
        Ok(config)
    }

    /// Audit trail location and whether this run is recorded
    pub fn audit_settings(&self) -> AuditSettings {
        AuditSettings {
            enabled: !self.no_audit,
            log_path: self.audit_log.clone(),
        }
    }
}

/// Execute the validate command
pub fn execute_validate(args: ValidateArgs) -> Result<ExitCode> {
    let config = args.resolve_config(&ConfigOverrides::from_env()?)?;
    tracing::debug!(?config, "Resolved validator configuration");

    let mut agent = DataQualityAgent::new(config)?;
    if let Some(trail) = args.audit_settings().open_trail()? {
        agent = agent.with_audit(trail);
    }
    if args.metrics_file.is_some() {
        agent = agent.with_metrics(QualityMetricsRegistry::new()?);
    }

    let outcome = agent.validate_path(&args.dataset)?;

    if let Some(dir) = &args.output_dir {
        write_reports(&outcome, dir)?;
    }
    if let (Some(path), Some(metrics)) = (&args.metrics_file, agent.metrics()) {
        write_metrics_file(metrics, path)?;
    }

    match (args.format, args.report) {
        (OutputFormat::Table, _) => {
            write_report_table(&mut io::stdout(), &outcome.formatted, &outcome.report.issues)
                .map_err(|e| ValidationError::InternalError(e.to_string()))?;
        }
        (format, ReportView::Raw) => print_structured(&outcome.report, format)?,
        (format, ReportView::Formatted) => print_structured(&outcome.formatted, format)?,
    }

    Ok(ExitCode::from_severity(outcome.report.severity))
}

fn parse_json_arg(name: &str, raw: Option<&str>) -> Result<Option<serde_json::Value>> {
    raw.map(|text| {
        serde_json::from_str(text).map_err(|e| {
            ValidationError::invalid_input(format!("--{} is not valid JSON: {}", name, e))
        })
    })
    .transpose()
}

fn ensure_log_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ValidationError::file_error(format!(
            "Audit log '{}' does not exist",
            path.display()
        )))
    }
}

/// Execute an audit subcommand
pub fn execute_audit(command: AuditCommands) -> Result<ExitCode> {
    match command {
        AuditCommands::Log {
            agent,
            action,
            inputs,
            outputs,
            notes,
            audit_log,
            format,
        } => {
            let inputs = parse_json_arg("inputs", inputs.as_deref())?;
            let outputs = parse_json_arg("outputs", outputs.as_deref())?;

            let trail = AuditTrail::open(&audit_log)?;
            let entry = trail.log_action(&agent, &action, inputs, outputs, notes.as_deref())?;

            match format {
                OutputFormat::Table => write_entries_table(&mut io::stdout(), &[entry])
                    .map_err(|e| ValidationError::InternalError(e.to_string()))?,
                other => print_structured(&entry, other)?,
            }
            Ok(ExitCode::Success)
        }

        AuditCommands::Query {
            agent,
            action,
            since,
            until,
            notes_match,
            limit,
            audit_log,
            format,
        } => {
            ensure_log_exists(&audit_log)?;

            let mut query = AuditQuery::new();
            if let Some(agent) = agent {
                query = query.agent(agent);
            }
            if let Some(action) = action {
                query = query.action(action);
            }
            if let Some(since) = since {
                query = query.since(since);
            }
            if let Some(until) = until {
                query = query.until(until);
            }
            if let Some(pattern) = notes_match {
                query = query.notes_matching(&pattern)?;
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }

            let entries = query.apply(read_entries(&audit_log)?);
            tracing::debug!(matched = entries.len(), "Audit query evaluated");

            match format {
                OutputFormat::Table => write_entries_table(&mut io::stdout(), &entries)
                    .map_err(|e| ValidationError::InternalError(e.to_string()))?,
                other => print_structured(&entries, other)?,
            }
            Ok(ExitCode::Success)
        }

        AuditCommands::Verify { audit_log, format } => {
            ensure_log_exists(&audit_log)?;
            let report = verify_path(&audit_log)?;

            match format {
                OutputFormat::Table => write_verification_table(&mut io::stdout(), &report)
                    .map_err(|e| ValidationError::InternalError(e.to_string()))?,
                other => print_structured(&report, other)?,
            }

            if report.valid {
                Ok(ExitCode::Success)
            } else {
                tracing::warn!(
                    line = ?report.broken_at_line,
                    reason = ?report.reason,
                    "Audit trail verification failed"
                );
                Ok(ExitCode::ValidationError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_MISSING_CRITICAL, ENV_MISSING_WARN, ENV_NA_VALUES};
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_validate_command() {
        let cli = DqCli::try_parse_from([
            "dq-validate",
            "-vv",
            "validate",
            "--dataset",
            "heart.csv",
            "--na-value",
            "?",
            "--missing-critical",
            "0.4",
            "--format",
            "json",
            "--report",
            "raw",
            "--no-audit",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            DqCommands::Validate(args) => {
                assert_eq!(args.dataset, PathBuf::from("heart.csv"));
                assert_eq!(args.na_values, vec!["?"]);
                assert_eq!(args.missing_critical, Some(0.4));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.report, ReportView::Raw);
                assert!(args.no_audit);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_audit_query() {
        let cli = DqCli::try_parse_from([
            "dq-validate",
            "audit",
            "query",
            "--agent",
            "ModelTrainer",
            "--since",
            "2024-01-01T00:00:00Z",
            "--limit",
            "5",
            "--audit-log",
            "trail.jsonl",
        ])
        .unwrap();

        match cli.command {
            DqCommands::Audit {
                command:
                    AuditCommands::Query {
                        agent,
                        since,
                        limit,
                        audit_log,
                        ..
                    },
            } => {
                assert_eq!(agent.as_deref(), Some("ModelTrainer"));
                assert_eq!(since.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
                assert_eq!(limit, Some(5));
                assert_eq!(audit_log, PathBuf::from("trail.jsonl"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let result = DqCli::try_parse_from([
            "dq-validate",
            "audit",
            "query",
            "--since",
            "yesterday",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_precedence() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "missing_critical_threshold = 0.5\nmissing_warn_threshold = 0.2").unwrap();

        let mut args = ValidateArgs::for_dataset("data.csv");
        args.config = Some(file.path().to_path_buf());
        args.missing_warn = Some(0.25);
        args.na_values = vec!["?".to_string()];

        let env = ConfigOverrides::from_lookup(env(&[
            (ENV_MISSING_WARN, "0.01"),
            (ENV_MISSING_CRITICAL, "0.9"),
            (ENV_NA_VALUES, "-"),
        ]))
        .unwrap();
        let config = args.resolve_config(&env).unwrap();

        assert_eq!(config.missing_warn_threshold, 0.25);
        assert_eq!(config.missing_critical_threshold, 0.5);
        assert_eq!(config.outlier_iqr_multiplier, 1.5);
        assert_eq!(config.na_values, vec!["-", "?"]);
    }

    #[test]
    fn test_resolved_config_is_validated() {
        let mut args = ValidateArgs::for_dataset("data.csv");
        args.missing_warn = Some(0.9);
        let err = args.resolve_config(&ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("inputs", None).unwrap(), None);
        assert_eq!(
            parse_json_arg("inputs", Some("{\"a\": 1}")).unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
        assert!(parse_json_arg("inputs", Some("{oops")).is_err());
    }

    #[test]
    fn test_verify_missing_log_is_file_error() {
        let err = execute_audit(AuditCommands::Verify {
            audit_log: PathBuf::from("/nonexistent/audit.jsonl"),
            format: OutputFormat::Json,
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::FileError(_)));
    }

    #[test]
    fn test_audit_settings_follow_flags() {
        let mut args = ValidateArgs::for_dataset("data.csv");
        assert!(!args.audit_settings().enabled);

        args.no_audit = false;
        args.audit_log = PathBuf::from("logs/trail.jsonl");
        let settings = args.audit_settings();
        assert!(settings.enabled);
        assert_eq!(settings.log_path, PathBuf::from("logs/trail.jsonl"));
    }

    fn log_command(audit_log: &Path, agent: &str, action: &str, notes: Option<&str>) -> AuditCommands {
        AuditCommands::Log {
            agent: agent.to_string(),
            action: action.to_string(),
            inputs: Some("{\"dataset\": \"heart.csv\"}".to_string()),
            outputs: None,
            notes: notes.map(str::to_string),
            audit_log: audit_log.to_path_buf(),
            format: OutputFormat::Json,
        }
    }

    fn query_command(audit_log: &Path, agent: Option<&str>, notes_match: Option<&str>) -> AuditCommands {
        AuditCommands::Query {
            agent: agent.map(str::to_string),
            action: None,
            since: None,
            until: None,
            notes_match: notes_match.map(str::to_string),
            limit: None,
            audit_log: audit_log.to_path_buf(),
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_audit_log_and_query_commands() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("audit.jsonl");

        let code = execute_audit(log_command(&log, "DataQualityValidator", "validation", Some("first"))).unwrap();
        assert_eq!(code, ExitCode::Success);
        execute_audit(log_command(&log, "ModelTrainer", "training", None)).unwrap();

        let entries = read_entries(&log).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].inputs["dataset"], "heart.csv");
        assert_eq!(entries[1].agent_name, "ModelTrainer");

        let code = execute_audit(query_command(&log, Some("ModelTrainer"), None)).unwrap();
        assert_eq!(code, ExitCode::Success);
    }

    #[test]
    fn test_audit_log_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("audit.jsonl");

        let mut command = log_command(&log, "a", "b", None);
        if let AuditCommands::Log { inputs, .. } = &mut command {
            *inputs = Some("{oops".to_string());
        }
        let err = execute_audit(command).unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
    }

    #[test]
    fn test_audit_query_bad_pattern_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("audit.jsonl");
        execute_audit(log_command(&log, "a", "b", Some("note"))).unwrap();

        let err = execute_audit(query_command(&log, None, Some("(unclosed"))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::AuditError(audit_trail::AuditError::InvalidQuery(_))
        ));
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
    }

    #[test]
    fn test_audit_verify_reports_broken_chain() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("audit.jsonl");
        execute_audit(log_command(&log, "DataQualityValidator", "validation", Some("HIGH"))).unwrap();
        execute_audit(log_command(&log, "DataQualityValidator", "validation", Some("LOW"))).unwrap();

        let verify = || AuditCommands::Verify {
            audit_log: log.clone(),
            format: OutputFormat::Json,
        };
        assert_eq!(execute_audit(verify()).unwrap(), ExitCode::Success);

        let content = std::fs::read_to_string(&log).unwrap();
        std::fs::write(&log, content.replacen("HIGH", "MEDIUM", 1)).unwrap();
        assert_eq!(execute_audit(verify()).unwrap(), ExitCode::ValidationError);
    }
}
