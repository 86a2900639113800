//! Catalog source backed by a JSON export of the item table.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use catalog_indexer_pipeline::{CatalogSource, SourceError};
use catalog_indexer_shared::CatalogRecord;

/// Catalog records loaded from a JSON array file.
pub struct JsonFileSource {
    records: Vec<CatalogRecord>,
}

impl JsonFileSource {
    /// Load records from `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::unavailable(format!("{}: {}", path.display(), e)))?;

        let source = Self::from_json(&raw)?;
        info!(path = %path.display(), count = source.records.len(), "Loaded catalog records");
        Ok(source)
    }

    /// Parse records from a JSON array.
    pub fn from_json(raw: &str) -> Result<Self, SourceError> {
        let records =
            serde_json::from_str(raw).map_err(|e| SourceError::decode(e.to_string()))?;
        Ok(Self { records })
    }

    /// Every record in the file, in file order.
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn fetch(&self, ids: &[i64]) -> Result<Vec<CatalogRecord>, SourceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"[
        {"id": 100002644680, "name": "Running Shoe", "price": 29900, "stock": 5, "status": 1},
        {"id": 100002644681, "name": "Wool Hat", "price": 1999, "isAD": false}
    ]"#;

    #[tokio::test]
    async fn test_fetch_by_ids() {
        let source = JsonFileSource::from_json(ITEMS).unwrap();

        let records = source.fetch(&[100002644681, 42]).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Wool Hat"));
        assert_eq!(source.records().len(), 2);
    }

    #[test]
    fn test_invalid_json() {
        let result = JsonFileSource::from_json(r#"{"id": 1}"#);

        assert!(matches!(result, Err(SourceError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = JsonFileSource::open("/nonexistent/items.json").await;

        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }
}
