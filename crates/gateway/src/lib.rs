//! HTTP gateway for the change-log projector.
//!
//! Accepts change-log batches over HTTP and projects them into the document
//! store, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use document_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projector::{BatchDispatcher, ErrorReporter, ProjectorConfig};
use tower_http::trace::TraceLayer;

use routes::batches::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/batches", post(routes::batches::receive::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}

/// Wires a store and reporter into application state.
///
/// A missing or invalid ID template leaves the projector unconfigured rather
/// than failing; every event is then reported as a configuration failure.
pub fn create_state<S: DocumentStore + 'static>(
    store: S,
    config: &ProjectorConfig,
    reporter: Arc<dyn ErrorReporter>,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        dispatcher: BatchDispatcher::from_config(store, config, reporter),
    })
}
