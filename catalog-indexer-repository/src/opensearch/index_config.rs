//! OpenSearch index configuration and mappings.
//!
//! This module defines the index naming scheme and the settings and mappings
//! for the catalog item index.

use serde_json::{json, Value};

/// The default alias that catalog documents are written through.
pub const DEFAULT_ALIAS: &str = "items";

/// Naming of the catalog index.
///
/// Documents are read and written through `alias`; the physical index is
/// `{alias}_v{version}` so mappings can be changed by creating a new version
/// and moving the alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Alias used for all document operations.
    pub alias: String,
    /// Version suffix of the physical index.
    pub version: u32,
}

impl IndexConfig {
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// Name of the physical index behind the alias.
    pub fn index_name(&self) -> String {
        format!("{}_v{}", self.alias, self.version)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS, 0)
    }
}

/// Get the index settings and mappings for the catalog item index.
///
/// The configuration includes:
/// - **text** on `name` with a `raw` keyword subfield for sorting and exact match
/// - **keyword** fields for filtering (category, brand, stock status)
/// - numeric fields for range filters and popularity sorting
/// - `image` stored but not indexed
pub fn get_index_settings(config: &IndexConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "aliases": {
            (config.alias.clone()): {}
        },
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "name": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "price": {
                    "type": "long"
                },
                "stock_status": {
                    "type": "keyword"
                },
                "image": {
                    "type": "keyword",
                    "index": false
                },
                "category": {
                    "type": "keyword"
                },
                "brand": {
                    "type": "keyword"
                },
                "sold": {
                    "type": "long"
                },
                "comment_count": {
                    "type": "long"
                },
                "is_ad": {
                    "type": "boolean"
                },
                "updated_at": {
                    "type": "date"
                }
            }
        }
    })
}
