//! Error types for the catalog indexer pipeline.

use thiserror::Error;

/// Errors that abort a whole sync pass.
///
/// Per-record index failures never surface here; they become `Failed`
/// outcomes.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The sync configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Records could not be fetched from the catalog.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl CoordinatorError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Errors returned by a catalog source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The item store could not be reached or read.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Records were read but could not be decoded.
    #[error("Failed to decode catalog records: {0}")]
    Decode(String),
}

impl SourceError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Failure to map a record into a document.
///
/// The current mapping is total and never produces this; it exists for
/// mappings that reject records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to map record {id}: {reason}")]
pub struct MappingError {
    pub id: String,
    pub reason: String,
}
