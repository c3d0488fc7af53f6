//! Error types for fairness evaluation

use thiserror::Error;

/// Result type alias for fairness operations
pub type Result<T> = std::result::Result<T, FairnessError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum FairnessError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FairnessError {
    /// Length mismatch between two index-aligned inputs
    pub(crate) fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        FairnessError::ShapeError {
            expected: format!("{} of length {}", what, expected),
            actual: format!("length {}", actual),
        }
    }
}

impl From<polars::error::PolarsError> for FairnessError {
    fn from(err: polars::error::PolarsError) -> Self {
        FairnessError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FairnessError {
    fn from(err: serde_json::Error) -> Self {
        FairnessError::SerializationError(err.to_string())
    }
}
