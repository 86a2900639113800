//! Document mapper implementation.
//!
//! Transforms catalog records into IndexDocument structures for indexing.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use catalog_indexer_shared::{CatalogRecord, IndexDocument, ItemStatus, StockStatus};

/// Maps catalog records to index documents.
///
/// Mapping is a total, side-effect free function: absent or malformed
/// attributes are replaced by empty strings, zeros or `false`, so every
/// document carries the full field set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMapper;

impl DocumentMapper {
    /// Create a new document mapper.
    pub fn new() -> Self {
        Self
    }

    /// Map a single record.
    pub fn map(&self, record: &CatalogRecord) -> IndexDocument {
        IndexDocument {
            id: record.document_id(),
            name: text(&record.name),
            price: non_negative(record.price),
            stock_status: StockStatus::from_stock(record.stock),
            image: text(&record.image),
            category: text(&record.category),
            brand: text(&record.brand),
            sold: non_negative(record.sold),
            comment_count: non_negative(record.comment_count),
            is_ad: record.is_ad.unwrap_or(false),
            updated_at: record
                .updated_at
                .or(record.created_at)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Map a batch of records, preserving order.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub fn map_batch(&self, records: &[CatalogRecord]) -> Vec<IndexDocument> {
        let documents: Vec<IndexDocument> = records.iter().map(|r| self.map(r)).collect();
        debug!(document_count = documents.len(), "Mapped record batch");
        documents
    }

    /// Whether a record belongs in the index at all.
    ///
    /// Deleted items are removed from the index rather than written.
    pub fn should_index(&self, record: &CatalogRecord) -> bool {
        !matches!(record.status, Some(ItemStatus::Deleted))
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn non_negative(value: Option<i64>) -> i64 {
    value.unwrap_or(0).max(0)
}
