//! Error types for the Charla chat core.
//!
//! This module defines a unified error enum that covers all error categories
//! in the pipeline: input validation, configuration, embedding, retrieval,
//! generation, and persistence.

use thiserror::Error;

/// Unified error type for the Charla chat core.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (e.g. an empty message). Rejected synchronously,
    /// before any collaborator is contacted.
    #[error("Input error: {0}")]
    Input(String),

    /// Embedding collaborator failures, including vector dimension
    /// mismatches detected during normalization.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector-search or keyword-search collaborator failures.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation model failures, including a model reply with no usable text.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Conversation persistence failures. The orchestrator logs and discards
    /// these; they are never surfaced to the caller.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
