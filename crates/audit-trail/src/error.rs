//! Error types for the audit trail

use thiserror::Error;

/// Errors raised while writing, reading or verifying the audit trail
#[derive(Error, Debug)]
pub enum AuditError {
    /// File access or I/O error
    #[error("Audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be serialized or deserialized
    #[error("Audit serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored line is not a valid entry
    #[error("Audit log corrupted at line {line}: {reason}")]
    Corrupted { line: usize, reason: String },

    /// Entry rejected before it was written
    #[error("Invalid audit entry: {0}")]
    InvalidEntry(String),

    /// Query parameters could not be compiled
    #[error("Invalid audit query: {0}")]
    InvalidQuery(String),
}

impl AuditError {
    /// Create an invalid entry error
    pub fn invalid_entry(msg: impl Into<String>) -> Self {
        AuditError::InvalidEntry(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        AuditError::InvalidQuery(msg.into())
    }

    /// Check if this error was caused by caller input rather than storage
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AuditError::InvalidEntry(_) | AuditError::InvalidQuery(_)
        )
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
