//! Core projection trait and per-event outcomes.

use async_trait::async_trait;
use change_record::ChangeEvent;
use common::{CollectionName, DocumentId};
use serde::Serialize;

use crate::Result;

/// What applying one change event did to the document store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EventOutcome {
    /// A new document was written, creating the collection if needed.
    Inserted {
        collection: CollectionName,
        id: DocumentId,
        created_collection: bool,
    },
    /// An existing document was replaced in full.
    Modified {
        collection: CollectionName,
        id: DocumentId,
    },
    /// A document was deleted.
    Removed {
        collection: CollectionName,
        id: DocumentId,
    },
    /// The event type is not one the projection acts on.
    Skipped { event_name: String },
}

impl EventOutcome {
    /// Short label for the operation performed.
    pub fn operation(&self) -> &'static str {
        match self {
            EventOutcome::Inserted { .. } => "inserted",
            EventOutcome::Modified { .. } => "modified",
            EventOutcome::Removed { .. } => "removed",
            EventOutcome::Skipped { .. } => "skipped",
        }
    }

    pub fn collection(&self) -> Option<&CollectionName> {
        match self {
            EventOutcome::Inserted { collection, .. }
            | EventOutcome::Modified { collection, .. }
            | EventOutcome::Removed { collection, .. } => Some(collection),
            EventOutcome::Skipped { .. } => None,
        }
    }

    /// The affected document, if any.
    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            EventOutcome::Inserted { id, .. }
            | EventOutcome::Modified { id, .. }
            | EventOutcome::Removed { id, .. } => Some(id),
            EventOutcome::Skipped { .. } => None,
        }
    }
}

/// A projection that applies change events to a read-side store.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Applies a single change event.
    async fn handle(&self, event: &ChangeEvent) -> Result<EventOutcome>;
}
