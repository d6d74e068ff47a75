//! CLI command handlers

pub mod ask;
pub mod config;
pub mod ingest;
pub mod search;
pub mod serve;
pub mod status;

use anyhow::Result;
use pdfqa_core::{
    CollectionStore, Config, DocumentChunker, HttpEmbedder, HttpGenerator, MetadataFilter,
    PdfQaError, RagPipeline,
};
use std::sync::Arc;

/// Join positional words back into one string, rejecting blank input
pub fn joined(words: &[String], what: &str) -> Result<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(PdfQaError::InvalidInput(format!("{} must not be empty", what)).into());
    }
    Ok(text)
}

/// Parse repeated `--filter` expressions into one conjunction
pub fn parse_filters(exprs: &[String]) -> Result<Option<MetadataFilter>> {
    let filters = exprs
        .iter()
        .map(|expr| MetadataFilter::parse(expr))
        .collect::<pdfqa_core::Result<Vec<_>>>()?;
    Ok(MetadataFilter::all(filters))
}

/// Wire the HTTP adapters and the store into a pipeline
///
/// Probes the embedding service; an unreachable service fails here.
pub async fn build_pipeline(config: &Config) -> Result<RagPipeline> {
    let store = Arc::new(CollectionStore::open(&config.vector_store)?);
    let embedder = Arc::new(HttpEmbedder::connect(config.llm_service.clone()).await?);
    let generator = Arc::new(HttpGenerator::from_config(config.llm_service.clone())?);
    let chunker = DocumentChunker::from_config(&config.chunking)?;

    let pipeline = RagPipeline::builder()
        .embedder(embedder)
        .store(store)
        .generator(generator)
        .chunker(chunker)
        .retrieval(config.retrieval)
        .embedding_batch_size(config.llm_service.embedding_batch_size)
        .build()?;
    Ok(pipeline)
}
