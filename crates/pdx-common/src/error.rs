//! Error types for PDX

use thiserror::Error;

/// Result type alias for PDX operations
pub type Result<T> = std::result::Result<T, PdxError>;

/// Main error type for PDX
#[derive(Error, Debug)]
pub enum PdxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Protein not found: {0}")]
    ProteinNotFound(String),

    #[error("Invalid access code: {0}")]
    InvalidAccessCode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
