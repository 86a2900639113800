//! # Catalog Indexer Pipeline
//!
//! This crate provides the components that keep the search index in step with
//! the item catalog.
//!
//! ## Architecture
//!
//! A sync pass follows the Source-Processor-Loader pattern:
//!
//! 1. **Source**: Fetches catalog records from the item store
//! 2. **Processor**: Maps records into index documents
//! 3. **Loader**: Writes documents in batches, retrying transient failures
//! 4. **Orchestrator**: Drives the pass and records a per-record outcome

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod source;

#[cfg(test)]
mod testing;

pub use errors::{CoordinatorError, MappingError, SourceError};
pub use loader::{BatchWriter, RetryPolicy, WriteReport};
pub use orchestrator::{CancelHandle, SyncConfig, SyncCoordinator};
pub use processor::DocumentMapper;
pub use source::CatalogSource;
