//! Typed change records and their projection primitives.
//!
//! This crate holds the pieces that turn one change-log record into
//! something a document store can accept:
//! - [`TypedNode`]: the type-tagged value encoding used by change records
//! - [`decode`] / [`decode_record`]: typed nodes to plain [`common::Document`]s
//! - [`KeyTemplate`]: document IDs rendered from a record's key fields
//! - [`resolve_collection`]: target collection derived from the record's source
//! - [`ChangeEvent`] and [`StreamBatch`]: the change-log wire format

pub mod decode;
pub mod error;
pub mod event;
pub mod node;
pub mod route;
pub mod template;

pub use decode::{Decoded, RESERVED_FIELDS, decode, decode_record, escape_field_name, parse_number};
pub use error::{RecordError, Result};
pub use event::{ChangeEvent, ChangeEventBuilder, EventType, StreamBatch, StreamChange};
pub use node::{Record, TypedNode, record};
pub use route::resolve_collection;
pub use template::{KeyTemplate, resolve};
