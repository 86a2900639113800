//! Processor module for the catalog indexer pipeline.
//!
//! Maps catalog records into index documents.

mod document_mapper;

pub use document_mapper::DocumentMapper;
