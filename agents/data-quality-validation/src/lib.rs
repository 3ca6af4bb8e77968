//! Data Quality Validation Agent
//!
//! Validates tabular datasets before they reach downstream modeling and
//! records every run in an append-only audit trail.
//!
//! ## Features
//!
//! - **Dataset loading**: CSV, TSV, JSON, JSON Lines and YAML with configurable missing-value tokens
//! - **Missing values**: per-column missing ratio against warn and critical thresholds
//! - **Type consistency**: non-numeric values in numeric columns and mixed value kinds
//! - **Outliers**: interquartile-range fences on numeric columns
//! - **Reports**: raw and formatted reports with severity, blocking issues and recommendations
//! - **Audit trail**: hash-chained JSON Lines entries with structured reasoning
//! - **Telemetry**: Prometheus metrics and structured `tracing` logs
//!
//! ## Architecture
//!
//! 1. **Dataset** (`dataset/`): cell values, columns and the file loader.
//! 2. **Engine** (`engine/`): the validator and its rules.
//! 3. **Report** (`report/`): raw report types and the formatted view.
//! 4. **Agent** (`agent`): load, validate, audit and export in one call.
//! 5. **CLI** (`cli/`): the `dq-validate` command.
//!
//! ## Example
//!
//! ```rust,no_run
//! use data_quality_validation::{DataQualityAgent, ValidatorConfig};
//! use audit_trail::AuditTrail;
//! use std::path::Path;
//!
//! let config = ValidatorConfig::builder().na_value("?").build().unwrap();
//! let agent = DataQualityAgent::new(config)
//!     .unwrap()
//!     .with_audit(AuditTrail::open("audit_log.jsonl").unwrap());
//!
//! let outcome = agent.validate_path(Path::new("heart_disease_uci.csv")).unwrap();
//! println!("{}", outcome.formatted.status.summary);
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod report;
pub mod telemetry;
pub mod trace;

pub use agent::{write_reports, DataQualityAgent, ValidationOutcome};
pub use cli::{DqCli, ExitCode, OutputFormat};
pub use config::{AuditSettings, ValidatorConfig};
pub use dataset::{CellValue, Column, Dataset, DatasetFormat, DatasetLoader};
pub use engine::rules::{QualityIssue, Rule, RuleCategory, Severity};
pub use engine::DataQualityValidator;
pub use error::{Result, ValidationError};
pub use report::{format_report, FormattedReport, ValidationReport};
pub use trace::ExecutionTrace;

/// Agent name recorded in audit entries
pub const AGENT_NAME: &str = "DataQualityValidator";

/// Agent version
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI and map any error to an exit code
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use data_quality_validation::{run_cli, DqCli};
///
/// let cli = DqCli::parse();
/// let exit_code = run_cli(cli);
/// std::process::exit(exit_code.into());
/// ```
pub fn run_cli(cli: DqCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            tracing::error!(error = %e, "Command failed");
            ExitCode::from_error(&e)
        }
    }
}
