//! Change-record error types.

use thiserror::Error;

/// Errors raised while interpreting a single change record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Required configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source identifier does not name a table.
    #[error("Table not found in source identifier '{0}'")]
    Routing(String),

    /// The ID template references a key field the record does not carry.
    #[error("Key field '{field}' referenced by the ID template is not present in the record keys")]
    Template { field: String },

    /// A typed node does not have the expected shape.
    #[error("Malformed typed node: {0}")]
    MalformedNode(String),

    /// A number literal is neither an integer nor a finite float.
    #[error("Invalid number literal: '{0}'")]
    InvalidNumber(String),

    /// An insert or modify record arrived without a new image.
    #[error("{event_type} record has no new image")]
    MissingNewImage { event_type: String },

    /// The record JSON does not match the change-log format.
    #[error("Malformed change record: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl RecordError {
    /// Short, stable label for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::Config(_) => "config",
            RecordError::Routing(_) => "routing",
            RecordError::Template { .. } => "template",
            RecordError::MalformedNode(_)
            | RecordError::InvalidNumber(_)
            | RecordError::MissingNewImage { .. }
            | RecordError::Malformed(_) => "decode",
        }
    }
}

/// Result type for change-record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
