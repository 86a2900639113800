//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentIndex` using
//! the OpenSearch Rust client.

use std::ops::Range;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    http::response::Response,
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteParts, GetParts, IndexParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::IndexClientConfig;
use crate::errors::IndexError;
use crate::interfaces::DocumentIndex;
use crate::opensearch::bulk::{
    attribute_results, build_bulk_request, build_delete_request, bulk_chunks, parse_bulk_items,
    parse_get_response, BulkAction, BulkRequest,
};
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use catalog_indexer_shared::IndexDocument;

/// OpenSearch-backed document index.
///
/// The client owns its HTTP transport; connections are released when the
/// client is dropped. It is safe to share one instance across tasks.
///
/// # Example
///
/// ```ignore
/// use catalog_indexer_repository::{IndexClientConfig, IndexConfig, OpenSearchClient};
///
/// let client = OpenSearchClient::new(
///     "http://localhost:9200",
///     IndexConfig::new("items", 0),
///     IndexClientConfig::default(),
/// )
/// .await?;
///
/// client.put(&IndexDocument::new("100002644680", "Running Shoe")).await?;
/// let doc = client.get("100002644680").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
    config: IndexClientConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index alias and version
    /// * `config` - Request timeout and bulk sizing
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(IndexError)` - If the URL is invalid or the transport cannot be built
    pub async fn new(
        url: &str,
        index_config: IndexConfig,
        config: IndexClientConfig,
    ) -> Result<Self, IndexError> {
        let parsed_url = Url::parse(url)
            .map_err(|e| IndexError::rejected(format!("Invalid OpenSearch URL {}: {}", url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| IndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
            config,
        })
    }

    /// The index configuration this client writes to.
    pub fn index_config(&self) -> &IndexConfig {
        &self.index_config
    }

    /// Map a transport-level failure to an index error.
    fn transport_error(e: opensearch::Error) -> IndexError {
        if e.is_timeout() {
            IndexError::timeout(e.to_string())
        } else {
            IndexError::connection(e.to_string())
        }
    }

    /// Turn a non-success response into a classified error.
    async fn status_error(response: Response, operation: &str) -> IndexError {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, operation, "OpenSearch request failed");
        IndexError::from_status(status.as_u16(), error_body)
    }

    /// Send one bulk request and return a result per item in it.
    async fn send_bulk(
        &self,
        body: Vec<opensearch::http::request::JsonBody<Value>>,
        count: usize,
        action: BulkAction,
    ) -> Vec<Result<(), IndexError>> {
        let response = match self
            .client
            .bulk(BulkParts::Index(&self.index_config.alias))
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = Self::transport_error(e);
                error!(error = %err, count, "Bulk request failed");
                return vec![Err(err); count];
            }
        };

        if !response.status_code().is_success() {
            let err = Self::status_error(response, "bulk").await;
            return vec![Err(err); count];
        }

        match response.json::<Value>().await {
            Ok(body) => parse_bulk_items(&body, count, action),
            Err(e) => {
                let err = IndexError::connection(format!("Failed to read bulk response: {}", e));
                vec![Err(err); count]
            }
        }
    }

    /// Split `len` inputs into requests of at most `max_bulk_size` items, send
    /// them in order and collect a result per input position.
    async fn send_chunked<F>(
        &self,
        len: usize,
        action: BulkAction,
        build: F,
    ) -> Vec<Result<(), IndexError>>
    where
        F: Fn(Range<usize>) -> (BulkRequest, Vec<(usize, IndexError)>) + Send + Sync,
    {
        let mut results: Vec<Result<(), IndexError>> = vec![Ok(()); len];

        for range in bulk_chunks(len, self.config.max_bulk_size) {
            let (request, rejected) = build(range);

            for (position, err) in rejected {
                results[position] = Err(err);
            }
            if request.positions.is_empty() {
                continue;
            }

            let items = self
                .send_bulk(request.body, request.positions.len(), action)
                .await;
            attribute_results(&mut results, &request.positions, items);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(failed, ?action, "Bulk request completed");
        results
    }
}

#[async_trait]
impl DocumentIndex for OpenSearchClient {
    /// Index a document under its id, replacing any existing version.
    ///
    /// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/index-document/
    #[instrument(skip(self, document), fields(id = %document.id))]
    async fn put(&self, document: &IndexDocument) -> Result<(), IndexError> {
        let body = serde_json::to_value(document)
            .map_err(|e| IndexError::rejected(format!("Failed to serialize document: {}", e)))?;

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &document.id))
            .body(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::status_error(response, "index").await);
        }

        debug!("Document indexed");
        Ok(())
    }

    /// Fetch a document by id, mapping 404 to `None`.
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<IndexDocument>, IndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(&self.index_config.alias, id))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!("Document not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::status_error(response, "get").await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexError::connection(format!("Failed to read get response: {}", e)))?;

        parse_get_response(&body, id)
    }

    /// Index documents through the bulk API, splitting into requests of at
    /// most `max_bulk_size` documents.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn put_batch(&self, documents: &[IndexDocument]) -> Vec<Result<(), IndexError>> {
        self.send_chunked(documents.len(), BulkAction::Index, |range| {
            build_bulk_request(&documents[range.clone()], range.start)
        })
        .await
    }

    /// Delete a document by id. A missing document counts as deleted.
    ///
    /// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/delete-document/
    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), IndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, id))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            return Err(Self::status_error(response, "delete").await);
        }

        debug!("Document deleted");
        Ok(())
    }

    /// Delete documents through the bulk API, split like `put_batch`.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_batch(&self, ids: &[String]) -> Vec<Result<(), IndexError>> {
        self.send_chunked(ids.len(), BulkAction::Delete, |range| {
            (build_delete_request(&ids[range.clone()], range.start), Vec::new())
        })
        .await
    }

    /// Create the versioned index with mappings and alias if it is missing.
    async fn ensure_index_exists(&self) -> Result<(), IndexError> {
        let index_name = self.index_config.index_name();

        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name.as_str()]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if exists.status_code().is_success() {
            debug!(index = %index_name, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_settings(&self.index_config))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::status_error(response, "create_index").await);
        }

        info!(index = %index_name, alias = %self.index_config.alias, "Created index");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, IndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexError::connection(format!("Failed to read health response: {}", e)))?;

        let status = body.get("status").and_then(Value::as_str).unwrap_or("red");
        debug!(status, "Cluster health");
        Ok(status != "red")
    }
}

impl Drop for OpenSearchClient {
    fn drop(&mut self) {
        debug!(alias = %self.index_config.alias, "Releasing OpenSearch client");
    }
}
