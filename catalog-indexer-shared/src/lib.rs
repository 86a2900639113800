//! # Catalog Indexer Shared
//!
//! Data types shared by the catalog indexer crates: the catalog record read
//! from the item store, the document written to the search index, and the
//! per-record outcome of a sync pass.

mod document;
mod outcome;
mod record;

pub use document::{IndexDocument, StockStatus};
pub use outcome::{SyncOutcome, SyncStatus, SyncSummary};
pub use record::{CatalogRecord, ItemStatus};
