//! Database layer for pdfqa
//!
//! Provides SQLite-based vector storage with:
//! - Chunk text, JSON metadata and little-endian f32 embedding BLOBs
//! - Brute-force cosine search with metadata filters
//! - One dimension per collection, fixed at first write

mod chunks;
mod metadata;
mod schema;
mod stats;
mod store;
pub mod vectors;

pub use metadata::MetadataFilter;
pub use schema::Database;
pub use stats::CollectionStats;
pub use store::CollectionStore;

use crate::error::Result;
use crate::index::Chunk;
use crate::providers::Metadata;
use async_trait::async_trait;

/// One nearest-neighbour hit, as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    /// Cosine distance, lower is closer
    pub distance: f32,
}

/// Persistent collection of chunks and their vectors
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append chunks with their vectors; all-or-nothing
    async fn add(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()>;

    /// Up to `top_k` nearest chunks by ascending distance
    async fn similarity_search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreHit>>;

    /// Number of stored chunks
    async fn count(&self) -> Result<usize>;

    /// Collection name
    fn collection_name(&self) -> &str;
}
