//! Integration tests for the gateway.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{CollectionName, DocumentId};
use document_store::InMemoryDocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use projector::{InMemoryReporter, ProjectorConfig};
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup_with_template(
    template: &str,
) -> (axum::Router, InMemoryDocumentStore, InMemoryReporter) {
    let store = InMemoryDocumentStore::new();
    let reporter = InMemoryReporter::new();
    let state = gateway::create_state(
        store.clone(),
        &ProjectorConfig::new(template),
        Arc::new(reporter.clone()),
    );
    let app = gateway::create_app(state, get_metrics_handle());
    (app, store, reporter)
}

fn setup() -> (axum::Router, InMemoryDocumentStore, InMemoryReporter) {
    setup_with_template("{organization_id}|{group_id}")
}

fn member_record(event_name: &str, org: &str, group: &str, name: &str) -> Value {
    json!({
        "eventID": format!("{org}-{group}"),
        "eventName": event_name,
        "eventSourceARN": "arn:aws:dynamodb:us-east-1:123456789:table/Members/stream/2020-01-01T00:00:00.000",
        "dynamodb": {
            "Keys": {
                "organization_id": {"N": org},
                "group_id": {"N": group}
            },
            "NewImage": {
                "organization_id": {"N": org},
                "group_id": {"N": group},
                "name": {"S": name}
            }
        }
    })
}

fn post_batch(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/batches")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["projector_configured"], true);
}

#[tokio::test]
async fn test_health_reports_missing_template() {
    let (app, _, _) = setup_with_template("");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = json_body(response).await;
    assert_eq!(json["projector_configured"], false);
}

#[tokio::test]
async fn test_batch_is_projected() {
    let (app, store, reporter) = setup();

    let batch = json!({
        "Records": [
            member_record("INSERT", "42", "7", "Alice"),
            member_record("MODIFY", "42", "8", "Bob"),
        ]
    });
    let response = app.oneshot(post_batch(batch.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["processed"], 2);
    assert_eq!(json["succeeded"], 2);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["results"][0]["operation"], "inserted");
    assert_eq!(json["results"][0]["collection"], "members");
    assert_eq!(json["results"][0]["document_id"], "42|7");
    assert_eq!(json["results"][1]["operation"], "modified");

    let members = CollectionName::new("members");
    assert!(store.document(&members, &DocumentId::new("42|7")).await.is_some());
    assert!(store.document(&members, &DocumentId::new("42|8")).await.is_some());
    assert!(reporter.is_empty());
}

#[tokio::test]
async fn test_partial_failure_still_returns_ok() {
    let (app, store, reporter) = setup();

    let mut unroutable = member_record("INSERT", "1", "1", "Alice");
    unroutable["eventSourceARN"] = json!("not-an-arn");
    let batch = json!({
        "Records": [
            unroutable,
            member_record("INSERT", "1", "2", "Bob"),
            member_record("TTL", "1", "3", "Carol"),
        ]
    });
    let response = app.oneshot(post_batch(batch.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["failed"], 1);
    assert_eq!(json["succeeded"], 2);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["results"][0]["status"], "failed");
    assert_eq!(json["results"][0]["kind"], "routing");
    assert_eq!(json["results"][2]["operation"], "skipped");

    assert_eq!(store.document_count(&CollectionName::new("members")).await, 1);
    assert_eq!(reporter.reports()[0].event_id.as_deref(), Some("1-1"));
}

#[tokio::test]
async fn test_unconfigured_gateway_fails_each_event() {
    let (app, store, reporter) = setup_with_template("");

    let batch = json!({"Records": [member_record("INSERT", "1", "1", "A")]});
    let response = app.oneshot(post_batch(batch.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][0]["kind"], "config");
    assert!(store.calls().await.is_empty());
    assert_eq!(reporter.len(), 1);
}

#[tokio::test]
async fn test_empty_batch() {
    let (app, _, _) = setup();

    let response = app.oneshot(post_batch("{}".to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["processed"], 0);
    assert_eq!(json["results"], json!([]));
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(post_batch("not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}
