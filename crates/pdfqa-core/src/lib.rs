//! pdfqa Core Library
//!
//! Question answering over a local PDF collection.
//!
//! # Features
//! - Per-page PDF loading with source metadata
//! - Recursive character chunking with overlap
//! - SQLite vector store with cosine search and metadata filters
//! - Multi-query retrieval with deduplication and a context cap
//! - Grounded answer generation through OpenAI-compatible services

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod providers;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, LLMServiceConfig, RetrievalConfig};
pub use db::{CollectionStats, CollectionStore, Database, MetadataFilter, StoreHit, VectorStore};
pub use error::{Error, PdfQaError, Result};
pub use index::{Chunk, DocumentChunker};
pub use llm::{ChatMessage, Embedder, Generator, HttpEmbedder, HttpGenerator, LLMClient, VLLMClient};
pub use pipeline::{Answer, BootstrapReport, RagPipeline, Source, NO_RELEVANT_INFORMATION};
pub use providers::{Document, DocumentLoader, Metadata, PdfLoader};
pub use search::{RetrievalResult, Retriever, SearchOptions};

/// Vector store file inside `vector_store.persist_directory`
pub const STORE_FILE_NAME: &str = "vectors.sqlite";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "pdfqa";
