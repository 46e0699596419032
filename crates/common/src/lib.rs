//! Shared types for the change-propagation bridge.
//!
//! - [`CollectionName`] and [`DocumentId`] identify where a projected document lives
//! - [`DecodedValue`], [`Number`] and [`Document`] form the plain document model
//!   produced by decoding typed change records

pub mod document;
pub mod types;

pub use document::{DecodedValue, Document, Number};
pub use types::{CollectionName, DocumentId};
