//! Source module for the catalog indexer pipeline.
//!
//! Defines how the pipeline reads records from the authoritative item store.

use async_trait::async_trait;

use crate::errors::SourceError;
use catalog_indexer_shared::CatalogRecord;

/// Read access to the item store that owns catalog records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the records with the given ids.
    ///
    /// Ids with no matching record are left out of the result; the order of
    /// the returned records is not significant.
    async fn fetch(&self, ids: &[i64]) -> Result<Vec<CatalogRecord>, SourceError>;
}
