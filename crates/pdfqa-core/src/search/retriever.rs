//! Semantic retrieval: embed the query, search the store, score and rank

use super::{RetrievalResult, SearchOptions};
use crate::db::VectorStore;
use crate::error::Result;
use crate::llm::Embedder;
use std::sync::Arc;

/// Query-side half of the pipeline
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve chunks for `query`
    ///
    /// Hits below `score_threshold` are dropped; survivors keep the store's
    /// order and are ranked 1..N without gaps.
    pub async fn retrieve(&self, query: &str, options: &SearchOptions) -> Result<Vec<RetrievalResult>> {
        if options.top_k == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!("Retrieving | query='{}' | top_k={}", query, options.top_k);

        let query_vector = self.embedder.embed(query).await?;
        let hits = self
            .store
            .similarity_search(&query_vector, options.top_k, options.filter.as_ref())
            .await?;

        if hits.is_empty() {
            tracing::debug!("No results returned from vector store | query='{}'", query);
            return Ok(Vec::new());
        }

        let results: Vec<RetrievalResult> = hits
            .into_iter()
            .map(|hit| (1.0 - hit.distance, hit))
            .filter(|(similarity, _)| *similarity >= options.score_threshold)
            .enumerate()
            .map(|(i, (similarity, hit))| RetrievalResult {
                chunk_id: hit.id,
                content: hit.content,
                metadata: hit.metadata,
                similarity_score: round4(similarity),
                rank: i + 1,
            })
            .collect();

        tracing::debug!(
            "Retrieval complete | query='{}' | results={}",
            query,
            results.len()
        );

        Ok(results)
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }
}

fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
