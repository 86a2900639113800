//! Document index trait definition.
//!
//! This module defines the abstract interface for writing catalog documents to
//! a search index and reading them back, allowing for different backend
//! implementations (OpenSearch, Elasticsearch, in-memory test doubles).

use async_trait::async_trait;

use crate::errors::IndexError;
use catalog_indexer_shared::IndexDocument;

/// Abstract interface for document index operations.
///
/// Implementations are injected into the sync coordinator as
/// `Arc<dyn DocumentIndex>`, so they must be safe to share across concurrent
/// batch operations.
///
/// # Error Handling
///
/// All methods return `Result<T, IndexError>`. Callers decide whether to retry
/// based on `IndexError::is_retryable`.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Upsert a single document by its id.
    ///
    /// If a document with the same id already exists, it is replaced. Putting
    /// the same document twice leaves one indexed document.
    ///
    /// # Arguments
    ///
    /// * `document` - The document to index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was indexed
    /// * `Err(IndexError)` - If indexing fails
    async fn put(&self, document: &IndexDocument) -> Result<(), IndexError>;

    /// Fetch a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(doc))` - If the document exists
    /// * `Ok(None)` - If no document has this id
    /// * `Err(IndexError)` - If the lookup itself fails
    async fn get(&self, id: &str) -> Result<Option<IndexDocument>, IndexError>;

    /// Upsert several documents and report a result per document.
    ///
    /// The returned vector has one entry per input document, in input order. A
    /// failure of one document does not prevent the others from being written.
    async fn put_batch(&self, documents: &[IndexDocument]) -> Vec<Result<(), IndexError>>;

    /// Remove a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted (or didn't exist)
    /// * `Err(IndexError)` - If the deletion fails
    async fn delete(&self, id: &str) -> Result<(), IndexError>;

    /// Remove several documents and report a result per id, in input order.
    ///
    /// Ids with no indexed document count as deleted.
    async fn delete_batch(&self, ids: &[String]) -> Vec<Result<(), IndexError>>;

    /// Ensure the index exists with the catalog item mappings.
    ///
    /// This should be called during application startup.
    async fn ensure_index_exists(&self) -> Result<(), IndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine reports a red cluster
    /// * `Err(IndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, IndexError>;
}
