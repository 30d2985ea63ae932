//! Error types for c3pa-eval.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for c3pa-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for c3pa-eval operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Data-model error from c3pa-core (missing field, bad taxonomy).
    #[error(transparent)]
    Core(#[from] c3pa_core::Error),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A file is not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// In-memory serialization failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A model backend failed to produce a label.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Backend configuration problem (unknown provider, missing key).
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Error::Inference(msg.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}
