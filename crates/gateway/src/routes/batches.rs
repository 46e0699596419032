//! Change-log batch intake.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use change_record::StreamBatch;
use document_store::DocumentStore;
use projector::{BatchDispatcher, BatchReport, ChangeProjector, EventOutcome, ProjectorError};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub dispatcher: BatchDispatcher<ChangeProjector<S>>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<EventResult>,
}

#[derive(Debug, Serialize)]
pub struct EventResult {
    pub index: usize,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventResult {
    fn from_result(index: usize, result: &Result<EventOutcome, ProjectorError>) -> Self {
        match result {
            Ok(outcome) => Self {
                index,
                status: "ok",
                operation: Some(outcome.operation()),
                collection: outcome.collection().map(ToString::to_string),
                document_id: outcome.document_id().map(ToString::to_string),
                kind: None,
                error: None,
            },
            Err(err) => Self {
                index,
                status: "failed",
                operation: None,
                collection: None,
                document_id: None,
                kind: Some(err.kind()),
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<&BatchReport> for BatchResponse {
    fn from(report: &BatchReport) -> Self {
        Self {
            processed: report.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            skipped: report.skipped(),
            results: report
                .results()
                .iter()
                .enumerate()
                .map(|(index, result)| EventResult::from_result(index, result))
                .collect(),
        }
    }
}

// -- Handlers --

/// POST /batches: project every record in a change-log batch.
///
/// Responds 200 whenever the body is a batch, even if some or all events
/// failed; failures are listed per event.
#[tracing::instrument(skip(state, payload))]
pub async fn receive<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<StreamBatch>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(batch) = payload?;
    metrics::counter!("gateway_batches_received").increment(1);
    tracing::info!(records = batch.len(), "received change batch");

    let report = state.dispatcher.process_records(&batch.records).await;
    Ok(Json(BatchResponse::from(&report)))
}
