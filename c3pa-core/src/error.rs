//! Error types for c3pa-core.

use thiserror::Error;

/// Result type for c3pa-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for c3pa-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A record lacks a field the operation cannot do without.
    #[error("Missing field `{field}` in {context}")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
        /// Where the record was found (model id, record index).
        context: String,
    },
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(field: &'static str, context: impl Into<String>) -> Self {
        Self::MissingField {
            field,
            context: context.into(),
        }
    }
}
