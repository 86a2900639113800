//! # Catalog Indexer
//!
//! Main library for the catalog search indexer.
//!
//! This crate provides the entry point wiring, configuration and logging setup
//! for running sync passes from the command line.

pub mod config;
pub mod source;
pub mod telemetry;

pub use config::{Dependencies, Settings};
pub use source::JsonFileSource;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Sync pass error.
    #[error("Sync error: {0}")]
    CoordinatorError(#[from] catalog_indexer_pipeline::CoordinatorError),

    /// Catalog source error.
    #[error("Source error: {0}")]
    SourceError(#[from] catalog_indexer_pipeline::SourceError),

    /// Search index error.
    #[error("Index error: {0}")]
    IndexError(#[from] catalog_indexer_repository::IndexError),

    /// The search cluster answered but reported itself unhealthy.
    #[error("Search cluster unhealthy: {0}")]
    Unhealthy(String),

    /// Output serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
