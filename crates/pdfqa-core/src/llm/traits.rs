//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Text generation trait: query rewriting and grounded answering
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce up to `num_variants` alternative phrasings of `query`
    async fn rewrite_query(&self, query: &str, num_variants: usize) -> Result<Vec<String>>;

    /// Answer `query` using only the supplied `context`
    async fn generate_answer(&self, query: &str, context: &str) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}
