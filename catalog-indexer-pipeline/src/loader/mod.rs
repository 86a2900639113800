//! Loader module for the catalog indexer pipeline.
//!
//! Writes mapped documents to the search index and deletes documents of
//! removed items, retrying transient failures per document.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use catalog_indexer_repository::{DocumentIndex, IndexError};
use catalog_indexer_shared::IndexDocument;

/// Retry behavior for transient index failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of write attempts per document, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for the delay between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt limit and default delays.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based): the initial backoff
    /// doubled for every earlier retry, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Final result of one document operation.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    /// Number of attempts made for the document.
    pub attempts: u32,
    /// Result of the last attempt.
    pub result: Result<(), IndexError>,
}

/// Something a batch operation is keyed by, for logging retries.
trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for IndexDocument {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for String {
    fn key(&self) -> &str {
        self
    }
}

/// Writes document batches to the index with exponential backoff retries.
///
/// Only documents that failed with a retryable error are resubmitted, as a
/// smaller batch. Rejected documents are reported after their first attempt.
/// Deletes follow the same rules.
pub struct BatchWriter {
    index: Arc<dyn DocumentIndex>,
    policy: RetryPolicy,
}

impl BatchWriter {
    /// Create a new batch writer with the default retry policy.
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self {
            index,
            policy: RetryPolicy::default(),
        }
    }

    /// Create a new batch writer with a custom retry policy.
    pub fn with_policy(index: Arc<dyn DocumentIndex>, policy: RetryPolicy) -> Self {
        Self { index, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Write `documents`, returning one report per document in input order.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn write_batch(&self, documents: &[IndexDocument]) -> Vec<WriteReport> {
        let index = &self.index;
        self.with_retries(documents, |batch: Vec<IndexDocument>| async move {
            index.put_batch(&batch).await
        })
        .await
    }

    /// Delete the documents with `ids`, returning one report per id in input order.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_batch(&self, ids: &[String]) -> Vec<WriteReport> {
        let index = &self.index;
        self.with_retries(ids, |batch: Vec<String>| async move {
            index.delete_batch(&batch).await
        })
        .await
    }

    /// Submit `items` through `submit` until every item has a final result
    /// or the attempt limit is reached.
    async fn with_retries<T, F, Fut>(&self, items: &[T], submit: F) -> Vec<WriteReport>
    where
        T: Keyed + Clone,
        F: Fn(Vec<T>) -> Fut,
        Fut: Future<Output = Vec<Result<(), IndexError>>>,
    {
        let mut reports: Vec<WriteReport> = items
            .iter()
            .map(|_| WriteReport {
                attempts: 0,
                result: Ok(()),
            })
            .collect();

        let mut pending: Vec<usize> = (0..items.len()).collect();
        let mut attempt = 0;

        while !pending.is_empty() && attempt < self.policy.max_attempts {
            attempt += 1;

            let batch: Vec<T> = pending.iter().map(|&i| items[i].clone()).collect();
            let mut results = submit(batch).await.into_iter();
            let mut retry = Vec::new();

            for position in pending {
                let result = results.next().unwrap_or_else(|| {
                    Err(IndexError::connection("Index returned no result for document"))
                });
                let report = &mut reports[position];
                report.attempts = attempt;

                match result {
                    Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                        debug!(
                            id = %items[position].key(),
                            attempt,
                            error = %e,
                            "Index operation failed, will retry"
                        );
                        report.result = Err(e);
                        retry.push(position);
                    }
                    result => report.result = result,
                }
            }

            pending = retry;

            if !pending.is_empty() {
                let delay = self.policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts = self.policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    retrying = pending.len(),
                    "Batch had transient failures, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        if attempt > 1 {
            let failed = reports.iter().filter(|r| r.result.is_err()).count();
            info!(attempts = attempt, failed, "Batch finished after retries");
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedIndex;

    fn docs(ids: &[&str]) -> Vec<IndexDocument> {
        ids.iter().map(|id| IndexDocument::new(*id, "Item")).collect()
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(4), Duration::from_millis(500));
        assert_eq!(policy.backoff(40), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_write_batch_success() {
        let index = Arc::new(ScriptedIndex::new());
        let writer = BatchWriter::new(index.clone());

        let reports = writer.write_batch(&docs(&["1", "2", "3"])).await;

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.result.is_ok() && r.attempts == 1));
        assert_eq!(index.stored_count().await, 3);
        assert_eq!(index.batch_sizes().await, vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_last_attempt() {
        let index = Arc::new(ScriptedIndex::new());
        index
            .fail("2", IndexError::connection("refused"), 2)
            .await;
        let writer = BatchWriter::new(index.clone());

        let reports = writer.write_batch(&docs(&["1", "2", "3"])).await;

        assert_eq!(reports[0].attempts, 1);
        assert_eq!(reports[1].attempts, 3);
        assert!(reports[1].result.is_ok());
        assert!(reports[2].result.is_ok());
        // Only the failing document is resubmitted.
        assert_eq!(index.batch_sizes().await, vec![3, 1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let index = Arc::new(ScriptedIndex::new());
        index.fail("1", IndexError::timeout("slow"), 3).await;
        let writer = BatchWriter::new(index.clone());

        let reports = writer.write_batch(&docs(&["1"])).await;

        assert_eq!(reports[0].attempts, 3);
        assert!(matches!(reports[0].result, Err(IndexError::Timeout(_))));
        assert!(index.stored("1").await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_is_not_retried() {
        let index = Arc::new(ScriptedIndex::new());
        index.fail("1", IndexError::rejected("bad field"), 1).await;
        let writer = BatchWriter::new(index.clone());

        let reports = writer.write_batch(&docs(&["1", "2"])).await;

        assert_eq!(reports[0].attempts, 1);
        assert!(matches!(reports[0].result, Err(IndexError::Rejected(_))));
        assert!(reports[1].result.is_ok());
        assert_eq!(index.batch_sizes().await, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_between_attempts() {
        let index = Arc::new(ScriptedIndex::new());
        index.fail("1", IndexError::connection("reset"), 2).await;
        let writer = BatchWriter::new(index);

        let start = tokio::time::Instant::now();
        writer.write_batch(&docs(&["1"])).await;

        // 100ms before the second attempt, 200ms before the third.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_batch_retries_transient_failures() {
        let index = Arc::new(ScriptedIndex::new());
        let writer = BatchWriter::new(index.clone());
        writer.write_batch(&docs(&["1", "2"])).await;
        index.fail("2", IndexError::connection("reset"), 1).await;

        let reports = writer
            .delete_batch(&["1".to_string(), "2".to_string(), "3".to_string()])
            .await;

        assert!(reports.iter().all(|r| r.result.is_ok()));
        assert_eq!(reports[1].attempts, 2);
        assert_eq!(index.stored_count().await, 0);
        assert_eq!(index.batch_sizes().await, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_delete_batch_rejected_is_not_retried() {
        let index = Arc::new(ScriptedIndex::new());
        index.fail("1", IndexError::rejected("forbidden"), 1).await;
        let writer = BatchWriter::new(index.clone());

        let reports = writer.delete_batch(&["1".to_string()]).await;

        assert_eq!(reports[0].attempts, 1);
        assert!(matches!(reports[0].result, Err(IndexError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let index = Arc::new(ScriptedIndex::new());
        let writer = BatchWriter::new(index.clone());

        let reports = writer.write_batch(&[]).await;

        assert!(reports.is_empty());
        assert!(index.batch_sizes().await.is_empty());
    }
}
