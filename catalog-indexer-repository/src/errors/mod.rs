//! Error types for the catalog indexer repository.

mod index_error;

pub use index_error::IndexError;
