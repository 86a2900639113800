//! Orchestrator module for the catalog indexer pipeline.
//!
//! Coordinates a sync pass: batching, mapping, writing and outcome tracking.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::CoordinatorError;
use crate::loader::{BatchWriter, RetryPolicy, WriteReport};
use crate::processor::DocumentMapper;
use crate::source::CatalogSource;
use catalog_indexer_repository::DocumentIndex;
use catalog_indexer_shared::{CatalogRecord, SyncOutcome, SyncSummary};

const CANCELLED_REASON: &str = "sync cancelled";
const NOT_FOUND_REASON: &str = "not found in catalog";

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Number of records written per batch.
    pub batch_size: usize,
    /// Number of batches allowed in flight at once. 1 means batches run
    /// strictly one after another.
    pub max_concurrent_batches: usize,
    /// Retry behavior for transient index failures.
    pub retry: RetryPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_batches: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Create a config with a custom batch size.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size,
            ..Default::default()
        }
    }

    /// Check that the configuration can drive a pass.
    pub fn validate(&self) -> Result<(), CoordinatorError> {
        if self.batch_size == 0 {
            return Err(CoordinatorError::invalid_config("batch_size must be at least 1"));
        }
        if self.max_concurrent_batches == 0 {
            return Err(CoordinatorError::invalid_config(
                "max_concurrent_batches must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(CoordinatorError::invalid_config("max_attempts must be at least 1"));
        }
        if self.retry.initial_backoff > self.retry.max_backoff {
            return Err(CoordinatorError::invalid_config(
                "initial_backoff must not exceed max_backoff",
            ));
        }
        Ok(())
    }
}

/// Handle that cancels the passes of a coordinator from elsewhere, e.g. a
/// signal handler.
///
/// A cancel applies to the passes running when it is issued: their batches
/// that have not started yet are skipped. Passes started afterwards run
/// normally, and a cancel issued while no pass is running has no effect.
#[derive(Clone)]
pub struct CancelHandle {
    /// Number of cancels issued so far. A pass is cancelled once the count
    /// moves past the value it saw when it started.
    tx: Arc<watch::Sender<u64>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    fn cancelled_since(&self, generation: u64) -> bool {
        self.generation() != generation
    }
}

/// Coordinator that keeps the search index in step with catalog records.
///
/// The coordinator:
/// - Splits records into fixed-size batches
/// - Maps each record into an index document
/// - Writes batches with per-document retries
/// - Returns exactly one outcome per input record, in input order
pub struct SyncCoordinator {
    source: Option<Arc<dyn CatalogSource>>,
    mapper: DocumentMapper,
    writer: BatchWriter,
    config: SyncConfig,
    cancel: CancelHandle,
}

impl SyncCoordinator {
    /// Create a new coordinator writing to `index` with default configuration.
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self::with_config(index, SyncConfig::default())
    }

    /// Create a new coordinator with custom configuration.
    pub fn with_config(index: Arc<dyn DocumentIndex>, config: SyncConfig) -> Self {
        let (tx, _) = watch::channel(0);

        Self {
            source: None,
            mapper: DocumentMapper::new(),
            writer: BatchWriter::with_policy(index, config.retry.clone()),
            config,
            cancel: CancelHandle { tx: Arc::new(tx) },
        }
    }

    /// Attach the catalog source used by `sync_ids`.
    pub fn with_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// A handle that can cancel passes run by this coordinator.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Cancel the running passes after their in-flight batches complete.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Sync `records` into the index.
    ///
    /// Returns one outcome per record, in input order. Index failures are
    /// reported in the outcomes; only an unusable configuration fails the
    /// whole pass, before anything is written.
    #[instrument(
        skip(self, records),
        fields(pass_id = %Uuid::new_v4(), record_count = records.len())
    )]
    pub async fn sync(
        &self,
        records: &[CatalogRecord],
    ) -> Result<Vec<SyncOutcome>, CoordinatorError> {
        self.config.validate()?;
        let generation = self.cancel.generation();

        info!(
            batch_size = self.config.batch_size,
            max_concurrent_batches = self.config.max_concurrent_batches,
            "Starting sync pass"
        );

        // The stream must not own a closure over borrowed chunks, or the pass
        // future cannot be spawned.
        let pending: Vec<_> = records
            .chunks(self.config.batch_size)
            .enumerate()
            .map(|(batch_index, batch)| self.sync_batch(generation, batch_index, batch))
            .collect();

        let batches: Vec<Vec<SyncOutcome>> = stream::iter(pending)
            .buffered(self.config.max_concurrent_batches)
            .collect()
            .await;

        let outcomes: Vec<SyncOutcome> = batches.into_iter().flatten().collect();
        let summary = SyncSummary::from_outcomes(&outcomes);

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Sync pass complete"
        );

        Ok(outcomes)
    }

    /// Fetch the records with `ids` from the catalog source and sync them.
    ///
    /// Returns one outcome per requested id, in request order. Ids the source
    /// does not know are reported as skipped.
    pub async fn sync_ids(&self, ids: &[i64]) -> Result<Vec<SyncOutcome>, CoordinatorError> {
        self.config.validate()?;

        let source = self
            .source
            .as_ref()
            .ok_or_else(|| CoordinatorError::invalid_config("no catalog source configured"))?;

        let fetched = source.fetch(ids).await?;
        let by_id: HashMap<i64, CatalogRecord> = fetched.into_iter().map(|r| (r.id, r)).collect();

        let records: Vec<CatalogRecord> = ids.iter().filter_map(|id| by_id.get(id).cloned()).collect();
        if records.len() < ids.len() {
            warn!(
                requested = ids.len(),
                found = records.len(),
                "Some ids were not found in the catalog"
            );
        }

        let mut synced = self.sync(&records).await?.into_iter();

        Ok(ids
            .iter()
            .map(|id| {
                if by_id.contains_key(id) {
                    synced.next().unwrap_or_else(|| {
                        SyncOutcome::failed(id.to_string(), "no outcome recorded", 0)
                    })
                } else {
                    SyncOutcome::skipped(id.to_string(), NOT_FOUND_REASON)
                }
            })
            .collect())
    }

    /// Map and write one batch, producing an outcome per record.
    ///
    /// Records of deleted items are removed from the index instead of written.
    #[instrument(skip(self, generation, records), fields(record_count = records.len()))]
    async fn sync_batch(
        &self,
        generation: u64,
        batch_index: usize,
        records: &[CatalogRecord],
    ) -> Vec<SyncOutcome> {
        if self.cancel.cancelled_since(generation) {
            warn!("Sync cancelled, skipping batch");
            return records
                .iter()
                .map(|r| SyncOutcome::skipped(r.document_id(), CANCELLED_REASON))
                .collect();
        }

        let mut outcomes: Vec<Option<SyncOutcome>> = vec![None; records.len()];
        let mut positions = Vec::with_capacity(records.len());
        let mut indexable = Vec::with_capacity(records.len());
        let mut deleted_positions = Vec::new();
        let mut deleted_ids = Vec::new();

        for (i, record) in records.iter().enumerate() {
            if self.mapper.should_index(record) {
                positions.push(i);
                indexable.push(record.clone());
            } else {
                deleted_positions.push(i);
                deleted_ids.push(record.document_id());
            }
        }

        let documents = self.mapper.map_batch(&indexable);
        let reports = self.writer.write_batch(&documents).await;

        for ((position, document), report) in positions.into_iter().zip(&documents).zip(reports) {
            outcomes[position] = Some(Self::outcome(&document.id, report, "index"));
        }

        if !deleted_ids.is_empty() {
            let reports = self.writer.delete_batch(&deleted_ids).await;

            for ((position, id), report) in deleted_positions.into_iter().zip(&deleted_ids).zip(reports) {
                outcomes[position] = Some(Self::outcome(id, report, "delete"));
            }
        }

        outcomes
            .into_iter()
            .zip(records)
            .map(|(outcome, record)| {
                outcome.unwrap_or_else(|| {
                    SyncOutcome::failed(record.document_id(), "no outcome recorded", 0)
                })
            })
            .collect()
    }

    fn outcome(id: &str, report: WriteReport, operation: &str) -> SyncOutcome {
        match report.result {
            Ok(()) => SyncOutcome::success(id, report.attempts),
            Err(e) => {
                error!(
                    id,
                    operation,
                    attempts = report.attempts,
                    error = %e,
                    "Index operation failed"
                );
                SyncOutcome::failed(id, e.to_string(), report.attempts)
            }
        }
    }
}
