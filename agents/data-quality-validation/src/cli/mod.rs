//! CLI module for the Data Quality Validation Agent
//!
//! Command-line interface for validating datasets and for logging,
//! querying and verifying the audit trail.

pub mod commands;
pub mod output;

pub use commands::{AuditCommands, DqCli, DqCommands, LogFormat, ValidateArgs};
pub use output::{OutputFormat, ReportView};

use crate::engine::rules::Severity;
use crate::error::ValidationError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution, dataset meets all checks
    Success = 0,
    /// Blocking issues found, or audit verification failed
    ValidationError = 1,
    /// Dataset usable but should be reviewed
    ValidationWarning = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a report's overall severity
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::High => ExitCode::ValidationError,
            Severity::Medium => ExitCode::ValidationWarning,
            Severity::Low => ExitCode::Success,
        }
    }

    /// Exit code for an error that aborted the command
    pub fn from_error(error: &ValidationError) -> Self {
        match error {
            ValidationError::FileError(_) => ExitCode::FileError,
            ValidationError::AuditError(audit_trail::AuditError::Io(_)) => ExitCode::FileError,
            e if e.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

/// Run the CLI and return the exit code
pub fn run(cli: DqCli) -> Result<ExitCode, ValidationError> {
    match cli.command {
        DqCommands::Validate(args) => commands::execute_validate(args),
        DqCommands::Audit { command } => commands::execute_audit(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::ValidationError), 1);
        assert_eq!(i32::from(ExitCode::ValidationWarning), 2);
        assert_eq!(i32::from(ExitCode::InvalidInput), 3);
        assert_eq!(i32::from(ExitCode::FileError), 4);
        assert_eq!(i32::from(ExitCode::InternalError), 10);
    }

    #[test]
    fn test_exit_code_from_severity() {
        assert_eq!(ExitCode::from_severity(Severity::Low), ExitCode::Success);
        assert_eq!(
            ExitCode::from_severity(Severity::Medium),
            ExitCode::ValidationWarning
        );
        assert_eq!(
            ExitCode::from_severity(Severity::High),
            ExitCode::ValidationError
        );
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&ValidationError::file_error("missing")),
            ExitCode::FileError
        );
        assert_eq!(
            ExitCode::from_error(&ValidationError::parse_error("ragged row")),
            ExitCode::InvalidInput
        );
        assert_eq!(
            ExitCode::from_error(&ValidationError::InternalError("boom".into())),
            ExitCode::InternalError
        );

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let audit = ValidationError::from(audit_trail::AuditError::from(io));
        assert_eq!(ExitCode::from_error(&audit), ExitCode::FileError);

        let bad_entry = ValidationError::from(audit_trail::AuditError::invalid_entry("empty"));
        assert_eq!(ExitCode::from_error(&bad_entry), ExitCode::InvalidInput);
    }
}
