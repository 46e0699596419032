//! Integration tests: ElasticsearchStore against a local fake of the index API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{head, put};
use common::DecodedValue;
use document_store::{
    CollectionName, CollectionSettings, Document, DocumentId, DocumentStore, DocumentStoreExt,
    ElasticsearchStore, StoreError, WriteOptions,
};
use serde_json::{Value, json};

type DocKey = (String, String, String);

/// Minimal stand-in for an Elasticsearch cluster.
#[derive(Clone, Default)]
struct FakeCluster {
    indices: Arc<Mutex<HashMap<String, Value>>>,
    documents: Arc<Mutex<HashMap<DocKey, Value>>>,
    refreshed: Arc<Mutex<Vec<String>>>,
}

async fn index_exists(State(cluster): State<FakeCluster>, Path(index): Path<String>) -> StatusCode {
    if index == "exploding" {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if cluster.indices.lock().unwrap().contains_key(&index) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn create_index(
    State(cluster): State<FakeCluster>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut indices = cluster.indices.lock().unwrap();
    if indices.contains_key(&index) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"type": "resource_already_exists_exception"}})),
        );
    }
    indices.insert(index.clone(), body);
    (
        StatusCode::OK,
        Json(json!({"acknowledged": true, "index": index})),
    )
}

async fn index_document(
    State(cluster): State<FakeCluster>,
    Path((index, doc_type, id)): Path<DocKey>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if params.get("refresh").map(String::as_str) == Some("true") {
        cluster.refreshed.lock().unwrap().push(id.clone());
    }
    cluster
        .indices
        .lock()
        .unwrap()
        .entry(index.clone())
        .or_insert_with(|| json!({}));
    let previous = cluster
        .documents
        .lock()
        .unwrap()
        .insert((index.clone(), doc_type, id.clone()), body);
    let result = if previous.is_some() { "updated" } else { "created" };
    (
        StatusCode::OK,
        Json(json!({"_index": index, "_id": id, "result": result})),
    )
}

async fn delete_document(
    State(cluster): State<FakeCluster>,
    Path(key): Path<DocKey>,
) -> (StatusCode, Json<Value>) {
    match cluster.documents.lock().unwrap().remove(&key) {
        Some(_) => (StatusCode::OK, Json(json!({"result": "deleted"}))),
        None => (StatusCode::NOT_FOUND, Json(json!({"result": "not_found"}))),
    }
}

async fn start_fake_cluster() -> (ElasticsearchStore, FakeCluster) {
    let cluster = FakeCluster::default();
    let app = Router::new()
        .route("/{index}", head(index_exists).put(create_index))
        .route(
            "/{index}/{doc_type}/{id}",
            put(index_document).delete(delete_document),
        )
        .with_state(cluster.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let store = ElasticsearchStore::new(&format!("http://{addr}")).unwrap();
    (store, cluster)
}

fn sample_document() -> Document {
    Document::from([
        ("name".to_string(), DecodedValue::from("Alice")),
        ("age".to_string(), DecodedValue::from(30i64)),
    ])
}

#[tokio::test]
async fn test_create_collection_with_coercion() {
    let (store, cluster) = start_fake_cluster().await;
    let users = CollectionName::new("Users");

    assert!(!store.exists(&users).await.unwrap());
    assert!(
        store
            .ensure_collection(&users, &CollectionSettings::default())
            .await
            .unwrap()
    );
    assert!(store.exists(&users).await.unwrap());

    let indices = cluster.indices.lock().unwrap();
    assert_eq!(
        indices["users"],
        json!({"settings": {"index.mapping.coerce": true}})
    );
}

#[tokio::test]
async fn test_upsert_writes_body_with_refresh() {
    let (store, cluster) = start_fake_cluster().await;
    let users = CollectionName::new("users");
    let id = DocumentId::new("42|7");

    let assigned = store
        .upsert(&users, &id, &sample_document(), &WriteOptions::immediate("doc"))
        .await
        .unwrap();

    assert_eq!(assigned, id);
    let documents = cluster.documents.lock().unwrap();
    let key = ("users".to_string(), "doc".to_string(), "42|7".to_string());
    assert_eq!(documents[&key], json!({"name": "Alice", "age": 30}));
    assert_eq!(*cluster.refreshed.lock().unwrap(), vec!["42|7".to_string()]);
}

#[tokio::test]
async fn test_upsert_uses_document_type() {
    let (store, cluster) = start_fake_cluster().await;
    let users = CollectionName::new("users");

    store
        .upsert(
            &users,
            &DocumentId::new("1"),
            &sample_document(),
            &WriteOptions::immediate("member"),
        )
        .await
        .unwrap();

    let documents = cluster.documents.lock().unwrap();
    assert!(documents.contains_key(&("users".to_string(), "member".to_string(), "1".to_string())));
}

#[tokio::test]
async fn test_delete_and_missing_document() {
    let (store, _cluster) = start_fake_cluster().await;
    let users = CollectionName::new("users");
    let id = DocumentId::new("user#1");
    let options = WriteOptions::default();

    store
        .upsert(&users, &id, &sample_document(), &options)
        .await
        .unwrap();
    store.delete(&users, &id, &options).await.unwrap();

    let err = store.delete(&users, &id, &options).await.unwrap_err();
    assert!(matches!(err, StoreError::DocumentNotFound { .. }));
}

#[tokio::test]
async fn test_backend_errors_carry_status() {
    let (store, _cluster) = start_fake_cluster().await;

    let err = store
        .exists(&CollectionName::new("exploding"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend { status: 500, .. }));

    let users = CollectionName::new("users");
    let settings = CollectionSettings::default();
    store.create(&users, &settings).await.unwrap();
    let err = store.create(&users, &settings).await.unwrap_err();
    match err {
        StoreError::Backend { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("resource_already_exists_exception"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = ElasticsearchStore::new(&format!("http://{addr}")).unwrap();
    let err = store.exists(&CollectionName::new("users")).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
