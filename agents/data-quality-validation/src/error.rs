//! Error types for the Data Quality Validation Agent
//!
//! Provides structured error types for loading, validation, audit and I/O operations.

use thiserror::Error;

/// Main error type for validation operations
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Dataset or configuration parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Audit trail failure
    #[error("Audit error: {0}")]
    AuditError(#[from] audit_trail::AuditError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ValidationError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ValidationError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        ValidationError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        ValidationError::ParseError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        match self {
            ValidationError::InvalidInput(_)
            | ValidationError::FileError(_)
            | ValidationError::ParseError(_) => true,
            ValidationError::AuditError(e) => e.is_user_error(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(err: std::io::Error) -> Self {
        ValidationError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ValidationError {
    fn from(err: serde_yaml::Error) -> Self {
        ValidationError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for ValidationError {
    fn from(err: toml::de::Error) -> Self {
        ValidationError::ParseError(format!("TOML error: {}", err))
    }
}

impl From<csv::Error> for ValidationError {
    fn from(err: csv::Error) -> Self {
        ValidationError::ParseError(format!("CSV error: {}", err))
    }
}

impl From<prometheus::Error> for ValidationError {
    fn from(err: prometheus::Error) -> Self {
        ValidationError::InternalError(format!("Metrics error: {}", err))
    }
}

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;
