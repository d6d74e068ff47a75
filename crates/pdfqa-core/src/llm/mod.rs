//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, TEI, OpenAI, etc.)
//! - Query rewriting and grounded answer generation

mod cache;
mod client;
mod http_embedder;
mod http_generator;
mod traits;

pub use cache::{embedding_cache_key, EmbeddingCache};
pub use client::{ChatMessage, CompletionOptions, LLMClient, VLLMClient};
pub use http_embedder::{l2_normalize, HttpEmbedder};
pub use http_generator::HttpGenerator;
pub use traits::*;
