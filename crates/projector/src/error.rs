//! Projector error types.

use change_record::RecordError;
use document_store::StoreError;
use thiserror::Error;

/// Errors that can occur while projecting a change event.
#[derive(Debug, Error)]
pub enum ProjectorError {
    /// The record could not be routed, decoded or given an ID, or the
    /// projector is not configured.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The document store rejected the operation.
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),
}

impl ProjectorError {
    /// Error category: `config`, `routing`, `template`, `decode` or `store`.
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectorError::Record(err) => err.kind(),
            ProjectorError::Store(_) => "store",
        }
    }
}

/// Result type for projector operations.
pub type Result<T> = std::result::Result<T, ProjectorError>;
