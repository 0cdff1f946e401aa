//! Errors raised while reading or writing model files.

use std::io;

/// Errors that can occur when reading a model.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON describing an inconsistent model.
    #[error("invalid model: {0}")]
    Validation(String),
}

/// Errors that can occur when writing a model.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
