//! Interface definitions for the document index.
//!
//! This module defines the abstract `DocumentIndex` trait that allows for
//! dependency injection and swappable search backend implementations.

mod document_index;

pub use document_index::DocumentIndex;
