//! RAG pipeline orchestrator
//!
//! [`RagPipeline`] ties the pieces together:
//!
//! - ingestion: load → split → embed → store, once, into an empty store
//! - querying: rewrite → retrieve per query (concurrently) → dedupe → cap →
//!   build context → grounded answer
//!
//! ```rust,ignore
//! let pipeline = RagPipeline::builder()
//!     .embedder(embedder)
//!     .store(store)
//!     .generator(generator)
//!     .chunker(DocumentChunker::from_config(&config.chunking)?)
//!     .retrieval(config.retrieval)
//!     .build()?;
//!
//! pipeline.bootstrap(&PdfLoader::from_config(&config.documents)).await?;
//! let answer = pipeline.run("What is the warranty period?").await?;
//! ```

use crate::config::RetrievalConfig;
use crate::db::{MetadataFilter, VectorStore};
use crate::error::{PdfQaError, Result};
use crate::index::{Chunk, DocumentChunker};
use crate::llm::{Embedder, Generator};
use crate::providers::{source_label, Document, DocumentLoader, Metadata};
use crate::search::{RetrievalResult, Retriever, SearchOptions};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Answer returned when retrieval finds nothing
pub const NO_RELEVANT_INFORMATION: &str = "No matching information found in your documents.";

const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 32;

/// Chunk cited by an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub chunk_id: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Final answer with its sources, in context order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

impl Answer {
    fn no_relevant_information() -> Self {
        Self {
            answer: NO_RELEVANT_INFORMATION.to_string(),
            sources: Vec::new(),
        }
    }

    /// Whether retrieval came back empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Outcome of [`RagPipeline::bootstrap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Store already held chunks; nothing was loaded
    pub skipped: bool,
    /// Documents loaded in this run
    pub documents: usize,
    /// Chunks added in this run
    pub chunks: usize,
    /// Chunks in the store afterwards
    pub stored: usize,
}

/// The RAG pipeline
pub struct RagPipeline {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    chunker: DocumentChunker,
    config: RetrievalConfig,
    embedding_batch_size: usize,
}

impl RagPipeline {
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        self.retriever.store()
    }

    /// Populate an empty store from `loader`; a non-empty store is left alone
    pub async fn bootstrap(&self, loader: &dyn DocumentLoader) -> Result<BootstrapReport> {
        let existing = self.store().count().await?;
        if existing > 0 {
            tracing::info!(
                "Vector DB already initialized | collection={} | chunks={}",
                self.store().collection_name(),
                existing
            );
            return Ok(BootstrapReport {
                skipped: true,
                documents: 0,
                chunks: 0,
                stored: existing,
            });
        }

        tracing::info!(
            "Vector DB empty, running ingestion | loader={}",
            loader.loader_type()
        );

        let documents = loader.load().await?;
        let chunks = self.ingest(&documents).await?;
        let stored = self.store().count().await?;

        tracing::info!(
            "Bootstrap complete | documents={} | chunks={}",
            documents.len(),
            chunks
        );

        Ok(BootstrapReport {
            skipped: false,
            documents: documents.len(),
            chunks,
            stored,
        })
    }

    /// Split, embed and store documents; returns the number of chunks added
    pub async fn ingest(&self, documents: &[Document]) -> Result<usize> {
        let chunks = self.chunker.split(documents);
        if chunks.is_empty() {
            tracing::warn!("No chunks produced, nothing to store");
            return Ok(0);
        }

        let vectors = self.embed_chunks(&chunks).await?;
        self.store().add(&chunks, &vectors).await?;
        Ok(chunks.len())
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let embedder = self.retriever.embedder();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let total_batches = texts.len().div_ceil(self.embedding_batch_size);

        let mut vectors = Vec::with_capacity(texts.len());
        for (idx, batch) in texts.chunks(self.embedding_batch_size).enumerate() {
            let embedded = embedder.embed_batch(batch).await?;
            if embedded.len() != batch.len() {
                return Err(PdfQaError::Llm(format!(
                    "Embedder returned {} vectors for {} chunks",
                    embedded.len(),
                    batch.len()
                )));
            }
            vectors.extend(embedded);
            tracing::info!("Embedded batch {}/{}", idx + 1, total_batches);
        }

        Ok(vectors)
    }

    /// Answer a question from the indexed documents
    pub async fn run(&self, query: &str) -> Result<Answer> {
        self.run_filtered(query, None).await
    }

    /// Answer a question, restricting retrieval to chunks matching `filter`
    pub async fn run_filtered(
        &self,
        query: &str,
        filter: Option<&MetadataFilter>,
    ) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PdfQaError::InvalidInput("Query must not be empty".to_string()));
        }

        tracing::info!("Processing query | query='{}'", query);

        let queries = self.query_variants(query).await;
        let results = self.retrieve_all(&queries, filter).await?;

        if results.is_empty() {
            tracing::info!("No relevant chunks found | query='{}'", query);
            return Ok(Answer::no_relevant_information());
        }

        let kept = dedupe_and_cap(results, self.config.max_context_chunks);
        let context = build_context(&kept);

        tracing::debug!(
            "Context built | chunks={} | chars={}",
            kept.len(),
            context.chars().count()
        );

        let answer = self.generator.generate_answer(query, &context).await?;
        let sources = kept
            .into_iter()
            .map(|r| Source {
                chunk_id: r.chunk_id,
                metadata: r.metadata,
                score: r.similarity_score,
            })
            .collect();

        Ok(Answer { answer, sources })
    }

    /// Original query first, then distinct rewrites
    async fn query_variants(&self, query: &str) -> Vec<String> {
        let mut queries = vec![query.to_string()];
        let num_variants = self.config.num_query_variants;
        if num_variants == 0 {
            return queries;
        }

        match self.generator.rewrite_query(query, num_variants).await {
            Ok(rewrites) => {
                for rewrite in rewrites.into_iter().take(num_variants) {
                    let rewrite = rewrite.trim();
                    if !rewrite.is_empty() && !queries.iter().any(|q| q == rewrite) {
                        queries.push(rewrite.to_string());
                    }
                }
            }
            Err(e) => tracing::warn!("Query rewriting failed, using original only: {}", e),
        }

        tracing::debug!("Retrieval queries | count={}", queries.len());
        queries
    }

    /// Retrieve for every query concurrently, concatenated in query order
    async fn retrieve_all(
        &self,
        queries: &[String],
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievalResult>> {
        let options = SearchOptions {
            top_k: self.config.top_k,
            score_threshold: self.config.score_threshold,
            filter: filter.cloned(),
        };

        let outcomes = join_all(queries.iter().map(|q| self.retriever.retrieve(q, &options))).await;

        let mut results = Vec::new();
        for (position, (query, outcome)) in queries.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(hits) => results.extend(hits),
                Err(e) if position == 0 => return Err(e),
                Err(e) => tracing::warn!("Retrieval failed for rewrite '{}': {}", query, e),
            }
        }

        Ok(results)
    }
}

/// Keep the first occurrence of each chunk, then the first `max` of those
fn dedupe_and_cap(results: Vec<RetrievalResult>, max: usize) -> Vec<RetrievalResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.chunk_id.clone()))
        .take(max)
        .collect()
}

/// `[Source: file, page n]` header per chunk, blank line between chunks
fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|r| format!("[Source: {}]\n{}", source_label(&r.metadata), r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builder for [`RagPipeline`]
#[derive(Default)]
pub struct RagPipelineBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn Generator>>,
    chunker: Option<DocumentChunker>,
    retrieval: Option<RetrievalConfig>,
    embedding_batch_size: Option<usize>,
}

impl RagPipelineBuilder {
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn chunker(mut self, chunker: DocumentChunker) -> Self {
        self.chunker = Some(chunker);
        self
    }

    pub fn retrieval(mut self, config: RetrievalConfig) -> Self {
        self.retrieval = Some(config);
        self
    }

    pub fn embedding_batch_size(mut self, batch_size: usize) -> Self {
        self.embedding_batch_size = Some(batch_size);
        self
    }

    pub fn build(self) -> Result<RagPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| PdfQaError::Config("pipeline requires an embedder".into()))?;
        let store = self
            .store
            .ok_or_else(|| PdfQaError::Config("pipeline requires a vector store".into()))?;
        let generator = self
            .generator
            .ok_or_else(|| PdfQaError::Config("pipeline requires a generator".into()))?;
        let chunker = self
            .chunker
            .ok_or_else(|| PdfQaError::Config("pipeline requires a chunker".into()))?;

        let config = self.retrieval.unwrap_or_default();
        if config.top_k == 0 {
            return Err(PdfQaError::Config("retrieval.top_k must be positive".into()));
        }
        if config.max_context_chunks == 0 {
            return Err(PdfQaError::Config(
                "retrieval.max_context_chunks must be positive".into(),
            ));
        }

        let embedding_batch_size = self
            .embedding_batch_size
            .unwrap_or(DEFAULT_EMBEDDING_BATCH_SIZE);
        if embedding_batch_size == 0 {
            return Err(PdfQaError::Config("embedding batch size must be positive".into()));
        }

        Ok(RagPipeline {
            retriever: Retriever::new(embedder, store),
            generator,
            chunker,
            config,
            embedding_batch_size,
        })
    }
}
