//! Document store interface consumed by the change projector.
//!
//! - [`DocumentStore`]: exists / create / upsert / delete against named collections
//! - [`InMemoryDocumentStore`]: call-recording store for tests and local runs
//! - [`ElasticsearchStore`]: the same operations over the Elasticsearch HTTP API

pub mod elasticsearch;
pub mod error;
pub mod memory;
pub mod store;

pub use common::{CollectionName, Document, DocumentId};
pub use elasticsearch::ElasticsearchStore;
pub use error::{Result, StoreError};
pub use memory::{InMemoryDocumentStore, StoreCall};
pub use store::{CollectionSettings, DocumentStore, DocumentStoreExt, WriteOptions};
