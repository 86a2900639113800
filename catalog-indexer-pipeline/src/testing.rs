//! In-memory document index used by the pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use catalog_indexer_repository::{DocumentIndex, IndexError};
use catalog_indexer_shared::IndexDocument;

/// Document index that stores documents in memory and fails writes of
/// selected ids according to a script.
#[derive(Default)]
pub(crate) struct ScriptedIndex {
    documents: Mutex<HashMap<String, IndexDocument>>,
    failures: Mutex<HashMap<String, VecDeque<IndexError>>>,
    batch_sizes: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every `put_batch` call take `delay` before it answers.
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    /// Fail the next `times` writes or deletes of `id` with `error`.
    pub(crate) async fn fail(&self, id: &str, error: IndexError, times: usize) {
        let mut failures = self.failures.lock().await;
        let queue = failures.entry(id.to_string()).or_default();
        for _ in 0..times {
            queue.push_back(error.clone());
        }
    }

    pub(crate) async fn stored(&self, id: &str) -> Option<IndexDocument> {
        self.documents.lock().await.get(id).cloned()
    }

    pub(crate) async fn stored_count(&self) -> usize {
        self.documents.lock().await.len()
    }

    /// Sizes of every `put_batch` and `delete_batch` call, in call order.
    pub(crate) async fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().await.clone()
    }

    /// Highest number of `put_batch` calls observed running at once.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn scripted_failure(&self, id: &str) -> Option<IndexError> {
        self.failures
            .lock()
            .await
            .get_mut(id)
            .and_then(VecDeque::pop_front)
    }

    async fn write(&self, document: &IndexDocument) -> Result<(), IndexError> {
        if let Some(error) = self.scripted_failure(&document.id).await {
            return Err(error);
        }
        self.documents
            .lock()
            .await
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), IndexError> {
        if let Some(error) = self.scripted_failure(id).await {
            return Err(error);
        }
        self.documents.lock().await.remove(id);
        Ok(())
    }
}

#[async_trait]
impl DocumentIndex for ScriptedIndex {
    async fn put(&self, document: &IndexDocument) -> Result<(), IndexError> {
        self.write(document).await
    }

    async fn get(&self, id: &str) -> Result<Option<IndexDocument>, IndexError> {
        Ok(self.stored(id).await)
    }

    async fn put_batch(&self, documents: &[IndexDocument]) -> Vec<Result<(), IndexError>> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.batch_sizes.lock().await.push(documents.len());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            results.push(self.write(document).await);
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        results
    }

    async fn delete(&self, id: &str) -> Result<(), IndexError> {
        self.remove(id).await
    }

    async fn delete_batch(&self, ids: &[String]) -> Vec<Result<(), IndexError>> {
        self.batch_sizes.lock().await.push(ids.len());

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(self.remove(id).await);
        }
        results
    }

    async fn ensure_index_exists(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, IndexError> {
        Ok(true)
    }
}
