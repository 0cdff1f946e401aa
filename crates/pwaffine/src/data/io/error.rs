//! Shared error types for dataset I/O.

use std::io;

use crate::data::DatasetError;

/// Errors that can occur when loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: cannot parse {token:?} as a number")]
    Parse { line: usize, token: String },

    #[error("line {line}: {source}")]
    Dataset {
        line: usize,
        #[source]
        source: DatasetError,
    },
}
