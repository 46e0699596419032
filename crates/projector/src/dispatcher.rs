//! Batch dispatch with per-event failure isolation.

use std::sync::Arc;

use change_record::{ChangeEvent, RecordError};
use document_store::DocumentStore;
use serde_json::Value;

use crate::config::ProjectorConfig;
use crate::projection::{EventOutcome, Projection};
use crate::projector::ChangeProjector;
use crate::reporter::{ErrorReporter, FailureReport};
use crate::{ProjectorError, Result};

/// Feeds change events through a projection one at a time.
///
/// Events are handled in batch order. A failing event is logged, counted and
/// handed to the [`ErrorReporter`]; the rest of the batch still runs.
pub struct BatchDispatcher<P: Projection> {
    projection: std::result::Result<P, String>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<P: Projection> BatchDispatcher<P> {
    /// Creates a dispatcher around a ready projection.
    pub fn new(projection: P, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            projection: Ok(projection),
            reporter,
        }
    }

    /// Returns true if events can be projected.
    pub fn is_configured(&self) -> bool {
        self.projection.is_ok()
    }

    /// Returns the projection, if configured.
    pub fn projection(&self) -> Option<&P> {
        self.projection.as_ref().ok()
    }

    /// Projects a single event without reporting failures.
    pub async fn process_event(&self, event: &ChangeEvent) -> Result<EventOutcome> {
        let projection = self
            .projection
            .as_ref()
            .map_err(|reason| RecordError::Config(reason.clone()))?;

        let outcome = projection.handle(event).await?;
        metrics::counter!("projector_events_processed", "operation" => outcome.operation())
            .increment(1);
        Ok(outcome)
    }

    /// Projects typed events in order.
    #[tracing::instrument(skip(self, events), fields(events = events.len()))]
    pub async fn process_batch(&self, events: &[ChangeEvent]) -> BatchReport {
        let mut results = Vec::with_capacity(events.len());
        for (position, event) in events.iter().enumerate() {
            let result = self.process_event(event).await;
            if let Err(err) = &result {
                let payload = serde_json::to_value(event).unwrap_or(Value::Null);
                self.fail(position, payload, err);
            }
            results.push(result);
        }
        BatchReport::finish(results)
    }

    /// Parses and projects raw change records in order.
    ///
    /// A record that does not parse fails on its own with a decode error.
    #[tracing::instrument(skip(self, records), fields(records = records.len()))]
    pub async fn process_records(&self, records: &[Value]) -> BatchReport {
        let mut results = Vec::with_capacity(records.len());
        for (position, raw) in records.iter().enumerate() {
            let result = match ChangeEvent::from_value(raw.clone()) {
                Ok(event) => self.process_event(&event).await,
                Err(err) => Err(err.into()),
            };
            if let Err(err) = &result {
                self.fail(position, raw.clone(), err);
            }
            results.push(result);
        }
        BatchReport::finish(results)
    }

    fn fail(&self, position: usize, payload: Value, error: &ProjectorError) {
        tracing::error!(
            position,
            kind = error.kind(),
            error = %error,
            payload = %payload,
            "failed to project change event"
        );
        metrics::counter!("projector_events_failed", "kind" => error.kind()).increment(1);
        self.reporter
            .report(&FailureReport::new(position, payload, error));
    }
}

impl<S: DocumentStore> BatchDispatcher<ChangeProjector<S>> {
    /// Builds a dispatcher from configuration.
    ///
    /// An unusable configuration does not abort startup: the dispatcher is
    /// built anyway and fails every event with a configuration error.
    pub fn from_config(
        store: S,
        config: &ProjectorConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let projection = ChangeProjector::new(store, config).map_err(|err| {
            tracing::error!(error = %err, "projector is not configured");
            match err {
                ProjectorError::Record(RecordError::Config(reason)) => reason,
                other => other.to_string(),
            }
        });
        Self {
            projection,
            reporter,
        }
    }
}

/// Per-event results of one batch, in batch order.
#[derive(Debug, Default)]
pub struct BatchReport {
    results: Vec<Result<EventOutcome>>,
}

impl BatchReport {
    fn finish(results: Vec<Result<EventOutcome>>) -> Self {
        let report = Self { results };
        tracing::info!(
            processed = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch processed"
        );
        report
    }

    pub fn results(&self) -> &[Result<EventOutcome>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Result<EventOutcome>> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Events that were applied or deliberately skipped.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(EventOutcome::Skipped { .. })))
            .count()
    }

    /// Failures with their batch positions.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &ProjectorError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(position, r)| r.as_ref().err().map(|err| (position, err)))
    }
}
