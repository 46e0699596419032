//! Change projection from a change log into a document store.
//!
//! This crate provides the write path of the bridge:
//! - [`Projection`] trait for applying one change event
//! - [`ChangeProjector`], which routes, decodes and writes each event
//! - [`BatchDispatcher`], which feeds a batch through a projection one event
//!   at a time, isolating failures
//! - [`ErrorReporter`] sinks that receive every failed event

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod projection;
pub mod projector;
pub mod reporter;

pub use config::{DEFAULT_DOCUMENT_TYPE, ProjectorConfig};
pub use dispatcher::{BatchDispatcher, BatchReport};
pub use error::{ProjectorError, Result};
pub use projection::{EventOutcome, Projection};
pub use projector::ChangeProjector;
pub use reporter::{ErrorReporter, FailureReport, InMemoryReporter, LogReporter};
