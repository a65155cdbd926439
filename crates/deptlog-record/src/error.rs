//! Record-level error types

use thiserror::Error;

/// Errors produced while normalizing raw documents into typed records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The document is not a JSON object at the top level.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// A present field could not be decoded into its typed form.
    #[error("record decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result alias for record operations.
pub type RecordResult<T> = Result<T, RecordError>;
