use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url, header};
use serde_json::Value;

use crate::{
    CollectionName, Document, DocumentId, Result, StoreError,
    store::{CollectionSettings, DocumentStore, WriteOptions},
};

/// Document store backed by the Elasticsearch HTTP API.
///
/// Collections map to indices and documents are addressed as
/// `/{index}/{document_type}/{id}`. Request signing is left to whatever sits
/// in front of the endpoint.
#[derive(Debug, Clone)]
pub struct ElasticsearchStore {
    base: Url,
    client: Client,
}

impl ElasticsearchStore {
    /// Creates a store for the given endpoint.
    ///
    /// An endpoint without a scheme is assumed to be HTTPS.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_client(endpoint, Client::new())
    }

    /// Creates a store that sends requests through an existing client.
    pub fn with_client(endpoint: &str, client: Client) -> Result<Self> {
        let with_scheme = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };
        let base = Url::parse(&with_scheme)
            .map_err(|_| StoreError::InvalidEndpoint(endpoint.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self { base, client })
    }

    /// Returns the base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, segments: &[&str], refresh: bool) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if refresh {
            url.query_pairs_mut().append_pair("refresh", "true");
        }
        Ok(url)
    }
}

async fn backend_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Backend { status, body }
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn exists(&self, collection: &CollectionName) -> Result<bool> {
        let url = self.url(&[collection.as_str()], false)?;
        let response = self.client.head(url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(backend_error(response).await)
        }
    }

    #[tracing::instrument(skip(self, settings), fields(index = %collection))]
    async fn create(
        &self,
        collection: &CollectionName,
        settings: &CollectionSettings,
    ) -> Result<()> {
        let url = self.url(&[collection.as_str()], false)?;
        let response = self
            .client
            .put(url)
            .json(&settings.to_json())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        metrics::counter!("document_store_requests", "operation" => "create").increment(1);
        Ok(())
    }

    #[tracing::instrument(skip(self, body, options), fields(index = %collection, id = %id))]
    async fn upsert(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        body: &Document,
        options: &WriteOptions,
    ) -> Result<DocumentId> {
        let url = self.url(
            &[collection.as_str(), options.document_type.as_str(), id.as_str()],
            options.refresh,
        )?;
        let payload = serde_json::to_vec(body)?;
        let response = self
            .client
            .put(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        metrics::counter!("document_store_requests", "operation" => "upsert").increment(1);

        let reply: Value = response.json().await?;
        let assigned = reply
            .get("_id")
            .and_then(Value::as_str)
            .map(DocumentId::from)
            .unwrap_or_else(|| id.clone());
        tracing::debug!(result = ?reply.get("result"), "document written");
        Ok(assigned)
    }

    #[tracing::instrument(skip(self, options), fields(index = %collection, id = %id))]
    async fn delete(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        options: &WriteOptions,
    ) -> Result<()> {
        let url = self.url(
            &[collection.as_str(), options.document_type.as_str(), id.as_str()],
            options.refresh,
        )?;
        let response = self.client.delete(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::DocumentNotFound {
                collection: collection.clone(),
                id: id.clone(),
            });
        }
        if !status.is_success() {
            return Err(backend_error(response).await);
        }
        metrics::counter!("document_store_requests", "operation" => "delete").increment(1);
        Ok(())
    }
}
