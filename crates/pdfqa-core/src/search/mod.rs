//! Search engine module
//!
//! Vector retrieval over the chunk store with score thresholding and ranking.

mod retriever;

pub use retriever::Retriever;

use crate::config::RetrievalConfig;
use crate::db::MetadataFilter;
use crate::providers::Metadata;
use serde::{Deserialize, Serialize};

/// Search options
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum number of hits requested from the store
    pub top_k: usize,
    /// Minimum similarity score (-1.0 - 1.0)
    pub score_threshold: f32,
    /// Metadata filter applied inside the store
    pub filter: Option<MetadataFilter>,
}

impl SearchOptions {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            score_threshold: config.score_threshold,
            filter: None,
        }
    }
}

/// Retrieval result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub content: String,
    pub metadata: Metadata,
    /// `1 - distance`, rounded to 4 decimals
    pub similarity_score: f32,
    /// 1-based position within this query's results
    pub rank: usize,
}
