//! Error types for the KPI Sentinel pipeline

use thiserror::Error;

/// Result type alias for KPI Sentinel operations
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Main error type for the detection pipeline
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Empty input: the table has no records")]
    EmptyInput,

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid configuration: {name} = {value}, {reason}")]
    InvalidConfig {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl SentinelError {
    /// Shorthand for an out-of-range configuration value
    pub fn invalid_config(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SentinelError::InvalidConfig {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for SentinelError {
    fn from(err: polars::error::PolarsError) -> Self {
        SentinelError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(err: serde_json::Error) -> Self {
        SentinelError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SentinelError {
    fn from(err: ndarray::ShapeError) -> Self {
        SentinelError::SchemaMismatch {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
