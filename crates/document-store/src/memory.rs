use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CollectionName, Document, DocumentId, Result, StoreError,
    store::{CollectionSettings, DocumentStore, WriteOptions},
};

/// One call made against an [`InMemoryDocumentStore`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Exists(CollectionName),
    Create(CollectionName, CollectionSettings),
    Upsert(CollectionName, DocumentId, WriteOptions),
    Delete(CollectionName, DocumentId, WriteOptions),
}

#[derive(Debug, Default)]
struct Collection {
    settings: CollectionSettings,
    documents: HashMap<DocumentId, Document>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<CollectionName, Collection>,
    calls: Vec<StoreCall>,
    fail_on_write: bool,
}

/// In-memory document store implementation for testing.
///
/// Behaves like the search engine where it matters to the projector:
/// writes are visible immediately, an upsert into a missing collection
/// creates it with default settings, and deleting a missing document fails.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent creates, upserts and deletes fail until reset.
    pub async fn set_fail_on_write(&self, fail: bool) {
        self.state.write().await.fail_on_write = fail;
    }

    /// Returns a stored document.
    pub async fn document(&self, collection: &CollectionName, id: &DocumentId) -> Option<Document> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .and_then(|c| c.documents.get(id))
            .cloned()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &CollectionName) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    /// Returns the settings a collection was created with.
    pub async fn collection_settings(&self, collection: &CollectionName) -> Option<CollectionSettings> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|c| c.settings)
    }

    /// Returns every call made so far, oldest first.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.read().await.calls.clone()
    }

    /// Clears all collections and the call log.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.collections.clear();
        state.calls.clear();
    }
}

fn check_writable(state: &State) -> Result<()> {
    if state.fail_on_write {
        return Err(StoreError::Unavailable("writes are disabled".to_string()));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn exists(&self, collection: &CollectionName) -> Result<bool> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Exists(collection.clone()));
        Ok(state.collections.contains_key(collection))
    }

    async fn create(
        &self,
        collection: &CollectionName,
        settings: &CollectionSettings,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .calls
            .push(StoreCall::Create(collection.clone(), *settings));
        check_writable(&state)?;

        if state.collections.contains_key(collection) {
            return Err(StoreError::Backend {
                status: 400,
                body: format!("resource_already_exists_exception: index [{collection}]"),
            });
        }
        state.collections.insert(
            collection.clone(),
            Collection {
                settings: *settings,
                documents: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        body: &Document,
        options: &WriteOptions,
    ) -> Result<DocumentId> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Upsert(
            collection.clone(),
            id.clone(),
            options.clone(),
        ));
        check_writable(&state)?;

        state
            .collections
            .entry(collection.clone())
            .or_default()
            .documents
            .insert(id.clone(), body.clone());
        Ok(id.clone())
    }

    async fn delete(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        options: &WriteOptions,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Delete(
            collection.clone(),
            id.clone(),
            options.clone(),
        ));
        check_writable(&state)?;

        let documents = &mut state
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.clone()))?
            .documents;
        documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.clone(),
                id: id.clone(),
            })
    }
}
