//! Error types for the PDX CLI
//!
//! User-facing error types with clear, actionable messages that help users
//! understand what went wrong and how to fix it.

use thiserror::Error;

use crate::db::DbError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Filter or sequence input failed validation; never retried
    #[error("Invalid search: {0}")]
    Validation(String),

    /// Access code rejected before or by the lookup table
    #[error("Access denied: {0}. Check the 6-digit code and try again.")]
    AccessDenied(String),

    /// Requested protein does not exist
    #[error("Protein {0} not found. Run 'pdx search' to find available proteins.")]
    ProteinNotFound(i64),

    /// Database operation failed after retries
    #[error("Database error: {0}. Check your DATABASE_URL and network connection.")]
    Database(#[from] DbError),

    /// CSV export failed
    #[error("Export failed: {0}. Check the output path and disk space.")]
    Export(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an access-denied error
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

impl From<crate::search::ValidationError> for CliError {
    fn from(err: crate::search::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<crate::search::service::SearchError> for CliError {
    fn from(err: crate::search::service::SearchError) -> Self {
        use crate::search::service::SearchError;
        match err {
            SearchError::Validation(e) => Self::Validation(e.to_string()),
            SearchError::Db(e) => Self::Database(e),
        }
    }
}
