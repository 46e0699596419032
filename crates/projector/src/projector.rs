//! Projection of change events into a document store.

use async_trait::async_trait;
use change_record::{ChangeEvent, EventType, KeyTemplate, decode_record, resolve_collection};
use document_store::{CollectionSettings, DocumentStore, DocumentStoreExt, WriteOptions};

use crate::Result;
use crate::config::ProjectorConfig;
use crate::projection::{EventOutcome, Projection};

/// Applies insert, modify and remove events to a [`DocumentStore`].
///
/// Each event is handled on its own: the collection comes from the event's
/// source, the document ID from its keys, and the body from its new image.
/// Writes and deletes are immediately visible. No retries happen here.
pub struct ChangeProjector<S: DocumentStore> {
    store: S,
    template: KeyTemplate,
    write_options: WriteOptions,
    settings: CollectionSettings,
}

impl<S: DocumentStore> ChangeProjector<S> {
    /// Creates a projector, validating the configuration.
    pub fn new(store: S, config: &ProjectorConfig) -> Result<Self> {
        let template = config.key_template()?;
        Ok(Self {
            store,
            template,
            write_options: WriteOptions::immediate(config.document_type.as_str()),
            settings: CollectionSettings::default(),
        })
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the parsed document ID template.
    pub fn template(&self) -> &KeyTemplate {
        &self.template
    }

    /// Writes the new image, creating the collection first if it is missing.
    #[tracing::instrument(skip(self, event), fields(source = %event.source))]
    pub async fn insert(&self, event: &ChangeEvent) -> Result<EventOutcome> {
        let collection = resolve_collection(&event.source)?;

        let created_collection = self
            .store
            .ensure_collection(&collection, &self.settings)
            .await?;
        if created_collection {
            tracing::info!(%collection, "created missing collection");
            metrics::counter!("projector_collections_created").increment(1);
        }

        let document = decode_record(event.new_image()?)?;
        let id = self.template.resolve(event.keys())?;
        let id = self
            .store
            .upsert(&collection, &id, &document, &self.write_options)
            .await?;

        tracing::info!(%collection, %id, "document inserted");
        Ok(EventOutcome::Inserted {
            collection,
            id,
            created_collection,
        })
    }

    /// Replaces the whole document with the new image.
    #[tracing::instrument(skip(self, event), fields(source = %event.source))]
    pub async fn modify(&self, event: &ChangeEvent) -> Result<EventOutcome> {
        let collection = resolve_collection(&event.source)?;
        let document = decode_record(event.new_image()?)?;
        let id = self.template.resolve(event.keys())?;
        let id = self
            .store
            .upsert(&collection, &id, &document, &self.write_options)
            .await?;

        tracing::info!(%collection, %id, "document replaced");
        Ok(EventOutcome::Modified { collection, id })
    }

    /// Deletes the document addressed by the event's keys.
    #[tracing::instrument(skip(self, event), fields(source = %event.source))]
    pub async fn remove(&self, event: &ChangeEvent) -> Result<EventOutcome> {
        let collection = resolve_collection(&event.source)?;
        let id = self.template.resolve(event.keys())?;
        self.store
            .delete(&collection, &id, &self.write_options)
            .await?;

        tracing::info!(%collection, %id, "document removed");
        Ok(EventOutcome::Removed { collection, id })
    }
}

#[async_trait]
impl<S: DocumentStore> Projection for ChangeProjector<S> {
    fn name(&self) -> &'static str {
        "ChangeProjector"
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<EventOutcome> {
        match &event.event_type {
            EventType::Insert => self.insert(event).await,
            EventType::Modify => self.modify(event).await,
            EventType::Remove => self.remove(event).await,
            EventType::Other(name) => {
                tracing::debug!(event_name = %name, "ignoring change event");
                Ok(EventOutcome::Skipped {
                    event_name: name.clone(),
                })
            }
        }
    }
}
