//! `VectorStore` over one collection of the SQLite database

use super::{CollectionStats, Database, MetadataFilter, StoreHit, VectorStore};
use crate::config::VectorStoreConfig;
use crate::error::{PdfQaError, Result};
use crate::index::Chunk;
use async_trait::async_trait;
use std::sync::Arc;

/// Named collection inside a shared [`Database`]
///
/// SQLite calls run on the blocking pool so request tasks never hold the
/// connection lock on a runtime worker.
#[derive(Clone)]
pub struct CollectionStore {
    db: Arc<Database>,
    name: String,
}

impl CollectionStore {
    pub fn new(db: Arc<Database>, name: impl Into<String>) -> Self {
        Self {
            db,
            name: name.into(),
        }
    }

    /// Open (or create) the store file described by `config`
    pub fn open(config: &VectorStoreConfig) -> Result<Self> {
        let path = config.database_path();
        let db = Database::open(&path)?;
        db.initialize()?;

        tracing::info!(
            "Vector store ready | path={:?} | collection={}",
            path,
            config.collection
        );
        Ok(Self::new(Arc::new(db), config.collection.clone()))
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Statistics for this collection
    pub fn stats(&self) -> Result<CollectionStats> {
        self.db.collection_stats(&self.name)
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &str) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let name = self.name.clone();
        tokio::task::spawn_blocking(move || f(&db, &name))
            .await
            .map_err(|e| PdfQaError::Other(anyhow::anyhow!("vector store task failed: {}", e)))?
    }
}

#[async_trait]
impl VectorStore for CollectionStore {
    async fn add(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        let chunks = chunks.to_vec();
        let vectors = vectors.to_vec();
        self.blocking(move |db, name| db.insert_chunks(name, &chunks, &vectors))
            .await
            .map(|_| ())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreHit>> {
        let vector = vector.to_vec();
        let filter = filter.cloned();
        self.blocking(move |db, name| db.search_chunks(name, &vector, top_k, filter.as_ref()))
            .await
    }

    async fn count(&self) -> Result<usize> {
        self.blocking(|db, name| db.count_chunks(name)).await
    }

    fn collection_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Metadata;

    fn chunk(id: &str, index: usize) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            chunk_index: index,
            content: id.to_uppercase(),
            metadata: Metadata::new(),
        }
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        let docs = CollectionStore::new(db.clone(), "docs");
        let other = CollectionStore::new(db, "other");

        docs.add(&[chunk("a", 0)], &[vec![1.0, 0.0]]).await.unwrap();

        assert_eq!(docs.count().await.unwrap(), 1);
        assert_eq!(other.count().await.unwrap(), 0);
        assert!(other
            .similarity_search(&[1.0, 0.0], 3, None)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(docs.collection_name(), "docs");
    }

    #[tokio::test]
    async fn test_open_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let config = VectorStoreConfig {
            collection: "pdf_documents".to_string(),
            persist_directory: dir.path().join("store"),
        };

        {
            let store = CollectionStore::open(&config).unwrap();
            store
                .add(&[chunk("a", 0), chunk("b", 1)], &[vec![1.0, 0.0], vec![0.0, 1.0]])
                .await
                .unwrap();
        }

        let reopened = CollectionStore::open(&config).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        assert_eq!(reopened.stats().unwrap().dimensions, Some(2));

        let hits = reopened
            .similarity_search(&[0.0, 1.0], 1, None)
            .await
            .unwrap();
        assert_eq!(hits[0].id, "b");
        assert_eq!(hits[0].content, "B");
    }
}
