//! # Catalog Indexer Repository
//!
//! This crate provides the document index abstraction used by the catalog
//! indexer and a concrete implementation backed by OpenSearch. It includes the
//! error taxonomy for index operations, the `DocumentIndex` trait, and the
//! index mappings for catalog items.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::IndexClientConfig;
pub use errors::IndexError;
pub use interfaces::DocumentIndex;
pub use opensearch::{IndexConfig, OpenSearchClient};
