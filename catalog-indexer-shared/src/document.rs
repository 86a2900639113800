//! The document shape stored in the search index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an item can currently be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    #[default]
    OutOfStock,
}

impl StockStatus {
    /// Derive the status from a units-on-hand count.
    pub fn from_stock(stock: Option<i64>) -> Self {
        match stock {
            Some(n) if n > 0 => Self::InStock,
            _ => Self::OutOfStock,
        }
    }
}

/// Denormalized item document indexed for search.
///
/// Every field is always present when serialized so the index sees a stable
/// schema; missing record attributes become empty strings, zeros or `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Document key; the catalog record id rendered as a string.
    pub id: String,
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    pub stock_status: StockStatus,
    pub image: String,
    pub category: String,
    pub brand: String,
    pub sold: i64,
    pub comment_count: i64,
    pub is_ad: bool,
    /// Last modification time of the source record.
    pub updated_at: DateTime<Utc>,
}

impl IndexDocument {
    /// Create a document with the given id and name and default values
    /// everywhere else.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: 0,
            stock_status: StockStatus::OutOfStock,
            image: String::new(),
            category: String::new(),
            brand: String::new(),
            sold: 0,
            comment_count: 0,
            is_ad: false,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_from_stock() {
        assert_eq!(StockStatus::from_stock(Some(3)), StockStatus::InStock);
        assert_eq!(StockStatus::from_stock(Some(0)), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_stock(Some(-2)), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_stock(None), StockStatus::OutOfStock);
    }

    #[test]
    fn test_serialized_document_has_every_field() {
        let doc = IndexDocument::new("1", "Shoe");
        let value = serde_json::to_value(&doc).unwrap();
        let fields = value.as_object().unwrap();

        for key in [
            "id",
            "name",
            "price",
            "stock_status",
            "image",
            "category",
            "brand",
            "sold",
            "comment_count",
            "is_ad",
            "updated_at",
        ] {
            assert!(fields.contains_key(key), "missing field {key}");
        }
        assert_eq!(value["stock_status"], "out_of_stock");
        assert_eq!(value["brand"], "");
    }
}
