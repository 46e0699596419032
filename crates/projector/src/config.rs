//! Projector configuration.

use change_record::{KeyTemplate, Result};

/// Document kind label used when none is configured.
pub const DEFAULT_DOCUMENT_TYPE: &str = "doc";

/// Settings the projector needs to write documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectorConfig {
    /// Document kind label passed with every write.
    pub document_type: String,
    /// Document ID template, e.g. `"{organization_id}|{group_id}"`. Required.
    pub id_template: String,
}

impl ProjectorConfig {
    /// Creates a configuration with the default document type.
    pub fn new(id_template: impl Into<String>) -> Self {
        Self {
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            id_template: id_template.into(),
        }
    }

    /// Sets the document type label.
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    /// Parses the ID template, failing with a configuration error if it is
    /// empty or malformed.
    pub fn key_template(&self) -> Result<KeyTemplate> {
        KeyTemplate::parse(&self.id_template)
    }
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self::new("")
    }
}
