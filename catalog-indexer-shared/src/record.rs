//! Catalog records as read from the item store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing state of a catalog item.
///
/// Stored as an integer code by the item store. Codes this crate doesn't know
/// are kept in `Other` so reading a record never fails on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ItemStatus {
    /// Listed and purchasable.
    OnSale,
    /// Temporarily removed from sale.
    OffShelf,
    /// Logically deleted.
    Deleted,
    /// Any code not listed above.
    Other(i32),
}

impl From<i32> for ItemStatus {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::OnSale,
            2 => Self::OffShelf,
            3 => Self::Deleted,
            other => Self::Other(other),
        }
    }
}

impl From<ItemStatus> for i32 {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::OnSale => 1,
            ItemStatus::OffShelf => 2,
            ItemStatus::Deleted => 3,
            ItemStatus::Other(code) => code,
        }
    }
}

/// A snapshot of one item from the catalog store.
///
/// Only `id` is guaranteed; every other attribute may be missing and is
/// normalized when the record is mapped to an index document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Stable unique identifier of the item.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Price in minor currency units (cents).
    #[serde(default)]
    pub price: Option<i64>,
    /// Units on hand.
    #[serde(default)]
    pub stock: Option<i64>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-form specification string, e.g. `{"color": "red"}`.
    #[serde(default)]
    pub spec: Option<String>,
    /// Units sold.
    #[serde(default)]
    pub sold: Option<i64>,
    #[serde(default)]
    pub comment_count: Option<i64>,
    /// Whether the item is a promoted listing.
    #[serde(default, alias = "isAD")]
    pub is_ad: Option<bool>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CatalogRecord {
    /// Create a record with only an id and a name set.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the price in cents.
    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the units on hand.
    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The identifier as used for the index document key.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ItemStatus::from(1), ItemStatus::OnSale);
        assert_eq!(ItemStatus::from(3), ItemStatus::Deleted);
        assert_eq!(ItemStatus::from(9), ItemStatus::Other(9));
        assert_eq!(i32::from(ItemStatus::OffShelf), 2);
    }

    #[test]
    fn test_deserialize_item_row() {
        let json = r#"{
            "id": 100002644680,
            "name": "Running Shoe",
            "price": 29900,
            "stock": 12,
            "commentCount": 4,
            "isAD": true,
            "status": 1,
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;

        let record: CatalogRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, 100002644680);
        assert_eq!(record.name.as_deref(), Some("Running Shoe"));
        assert_eq!(record.comment_count, Some(4));
        assert_eq!(record.is_ad, Some(true));
        assert_eq!(record.status, Some(ItemStatus::OnSale));
        assert!(record.brand.is_none());
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let record: CatalogRecord = serde_json::from_str(r#"{"id": 7}"#).unwrap();

        assert_eq!(record, CatalogRecord { id: 7, ..Default::default() });
        assert_eq!(record.document_id(), "7");
    }
}
