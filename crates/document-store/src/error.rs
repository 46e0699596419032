use thiserror::Error;

use crate::{CollectionName, DocumentId};

/// Errors reported by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionName),

    /// The document does not exist in the collection.
    #[error("Document {id} not found in collection {collection}")]
    DocumentNotFound {
        collection: CollectionName,
        id: DocumentId,
    },

    /// The backend answered with an error status.
    #[error("Document store returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid document store endpoint '{0}'")]
    InvalidEndpoint(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is unavailable.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
