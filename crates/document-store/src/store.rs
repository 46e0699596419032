use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{CollectionName, Document, DocumentId, Result};

/// Settings applied when a collection is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSettings {
    /// Let the store coerce values to the mapped field type instead of
    /// rejecting the document (e.g. `"30"` into a numeric field).
    pub coerce: bool,
}

impl CollectionSettings {
    /// Returns the settings as the request body for index creation.
    pub fn to_json(&self) -> Value {
        json!({ "settings": { "index.mapping.coerce": self.coerce } })
    }
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self { coerce: true }
    }
}

/// Options for document writes and deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Document kind label stored alongside the document.
    pub document_type: String,
    /// Make the change visible to reads before the call returns.
    pub refresh: bool,
}

impl WriteOptions {
    /// Options for a write that is visible as soon as the call returns.
    pub fn immediate(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            refresh: true,
        }
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::immediate("doc")
    }
}

/// Core trait for document store implementations.
///
/// The projector only needs these four operations. Retries, authentication
/// and connection handling belong to the implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns true if the collection exists.
    async fn exists(&self, collection: &CollectionName) -> Result<bool>;

    /// Creates a collection with the given settings.
    async fn create(&self, collection: &CollectionName, settings: &CollectionSettings)
    -> Result<()>;

    /// Writes a document, replacing any document with the same ID.
    ///
    /// Returns the ID the store assigned, which is the requested one.
    async fn upsert(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        body: &Document,
        options: &WriteOptions,
    ) -> Result<DocumentId>;

    /// Deletes a document.
    ///
    /// A missing document is reported as whatever error the store produces.
    async fn delete(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        options: &WriteOptions,
    ) -> Result<()>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Creates the collection if it does not exist yet.
    ///
    /// Returns true if this call created it.
    async fn ensure_collection(
        &self,
        collection: &CollectionName,
        settings: &CollectionSettings,
    ) -> Result<bool> {
        if self.exists(collection).await? {
            return Ok(false);
        }
        self.create(collection, settings).await?;
        Ok(true)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_enable_coercion() {
        assert_eq!(
            CollectionSettings::default().to_json(),
            json!({"settings": {"index.mapping.coerce": true}})
        );
    }

    #[test]
    fn immediate_writes_refresh() {
        let options = WriteOptions::immediate("item");
        assert!(options.refresh);
        assert_eq!(options.document_type, "item");
        assert_eq!(WriteOptions::default().document_type, "doc");
    }
}
