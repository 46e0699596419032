//! Sinks for events that could not be projected.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::ProjectorError;

/// Everything known about one failed event.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub report_id: Uuid,
    /// Index of the event within its batch.
    pub position: usize,
    pub event_id: Option<String>,
    pub kind: &'static str,
    pub message: String,
    /// The raw record as received.
    pub payload: Value,
    pub reported_at: DateTime<Utc>,
}

impl FailureReport {
    pub fn new(position: usize, payload: Value, error: &ProjectorError) -> Self {
        let event_id = payload
            .get("eventID")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            report_id: Uuid::new_v4(),
            position,
            event_id,
            kind: error.kind(),
            message: error.to_string(),
            payload,
            reported_at: Utc::now(),
        }
    }
}

/// Receives a report for every event that fails.
///
/// Reporting is fire-and-forget: a reporter must not fail the batch.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: &FailureReport);
}

/// Writes failure reports to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, report: &FailureReport) {
        let payload = report.payload.to_string();
        tracing::error!(
            target: "failure_report",
            report_id = %report.report_id,
            position = report.position,
            event_id = report.event_id.as_deref().unwrap_or("-"),
            kind = report.kind,
            error = %report.message,
            %payload,
            "change event failed"
        );
    }
}

/// Keeps failure reports in memory. Used in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReporter {
    reports: Arc<Mutex<Vec<FailureReport>>>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every report received so far.
    pub fn reports(&self) -> Vec<FailureReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|reports| reports.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for InMemoryReporter {
    fn report(&self, report: &FailureReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
    }
}
