//! Error types for smartcab

use thiserror::Error;

/// Main error type for smartcab
#[derive(Error, Debug)]
pub enum SmartcabError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid light: {0}")]
    InvalidLight(String),

    #[error("Invalid state key: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for smartcab operations
pub type Result<T> = std::result::Result<T, SmartcabError>;
