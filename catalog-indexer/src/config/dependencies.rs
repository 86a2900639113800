//! Dependency initialization and wiring for the catalog indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::IndexingError;
use catalog_indexer_pipeline::{CatalogSource, SyncCoordinator};
use catalog_indexer_repository::{DocumentIndex, OpenSearchClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The search index shared by every component.
    pub index: Arc<dyn DocumentIndex>,
    /// The configured coordinator ready to run sync passes.
    pub coordinator: SyncCoordinator,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// Connects to OpenSearch and verifies the cluster is healthy before
    /// building the coordinator.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(
        settings: &Settings,
        source: Option<Arc<dyn CatalogSource>>,
    ) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            alias = %settings.index.alias,
            batch_size = settings.sync.batch_size,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(
            &settings.opensearch_url,
            settings.index.clone(),
            settings.client.clone(),
        )
        .await
        .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let index: Arc<dyn DocumentIndex> = Arc::new(search_client);
        Self::verify_health(index.as_ref()).await?;

        info!("OpenSearch connection verified");

        Ok(Self::with_index(index, settings, source))
    }

    /// Fail unless the index reports a healthy cluster.
    ///
    /// A health check that cannot be executed surfaces as `IndexError`; a red
    /// cluster as `Unhealthy`.
    pub async fn verify_health(index: &dyn DocumentIndex) -> Result<(), IndexingError> {
        if !index.health_check().await? {
            return Err(IndexingError::Unhealthy("cluster status is red".to_string()));
        }
        Ok(())
    }

    /// Wire a coordinator around an already constructed index.
    pub fn with_index(
        index: Arc<dyn DocumentIndex>,
        settings: &Settings,
        source: Option<Arc<dyn CatalogSource>>,
    ) -> Self {
        let mut coordinator = SyncCoordinator::with_config(index.clone(), settings.sync.clone());
        if let Some(source) = source {
            coordinator = coordinator.with_source(source);
        }

        Self { index, coordinator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_indexer_repository::IndexError;
    use catalog_indexer_shared::IndexDocument;

    /// Index whose health check returns a fixed answer.
    struct HealthIndex(Result<bool, IndexError>);

    #[async_trait]
    impl DocumentIndex for HealthIndex {
        async fn put(&self, _document: &IndexDocument) -> Result<(), IndexError> {
            Ok(())
        }

        async fn get(&self, _id: &str) -> Result<Option<IndexDocument>, IndexError> {
            Ok(None)
        }

        async fn put_batch(&self, documents: &[IndexDocument]) -> Vec<Result<(), IndexError>> {
            vec![Ok(()); documents.len()]
        }

        async fn delete(&self, _id: &str) -> Result<(), IndexError> {
            Ok(())
        }

        async fn delete_batch(&self, ids: &[String]) -> Vec<Result<(), IndexError>> {
            vec![Ok(()); ids.len()]
        }

        async fn ensure_index_exists(&self) -> Result<(), IndexError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, IndexError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_verify_health_ok() {
        assert!(Dependencies::verify_health(&HealthIndex(Ok(true))).await.is_ok());
    }

    #[tokio::test]
    async fn test_red_cluster_is_unhealthy() {
        let result = Dependencies::verify_health(&HealthIndex(Ok(false))).await;

        assert!(matches!(result, Err(IndexingError::Unhealthy(_))));
    }

    #[tokio::test]
    async fn test_failed_health_check_is_index_error() {
        let index = HealthIndex(Err(IndexError::connection("connection refused")));

        let result = Dependencies::verify_health(&index).await;

        assert!(matches!(
            result,
            Err(IndexingError::IndexError(IndexError::ConnectionFailure(_)))
        ));
    }

    #[tokio::test]
    async fn test_with_index_wires_coordinator() {
        let settings = Settings::from_lookup(|key| {
            (key == "SYNC_BATCH_SIZE").then(|| "25".to_string())
        })
        .unwrap();

        let deps = Dependencies::with_index(Arc::new(HealthIndex(Ok(true))), &settings, None);

        assert_eq!(deps.coordinator.config().batch_size, 25);
    }
}
