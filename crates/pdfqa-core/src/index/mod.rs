//! Indexing pipeline
//!
//! Chunking of loaded documents into embeddable spans.

mod chunker;

pub use chunker::*;
