//! Document loading
//!
//! The ingestion side of the pipeline only needs a list of [`Document`]s.
//! Loaders implement [`DocumentLoader`]; the PDF loader is the default one.

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub mod pdf;

pub use pdf::PdfLoader;

/// Metadata attached to documents and chunks
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Well-known metadata keys
pub mod keys {
    pub const SOURCE: &str = "source";
    pub const PAGE: &str = "page";
    pub const TOTAL_PAGES: &str = "total_pages";
    pub const TITLE: &str = "title";
    pub const CHUNK_ID: &str = "chunk_id";
    pub const CHUNK_INDEX: &str = "chunk_index";
}

/// Raw text plus metadata, as produced by a loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Metadata,
}

impl Document {
    /// Create a document without metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add metadata to the document
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Source identifier, if the loader recorded one
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(keys::SOURCE).and_then(|v| v.as_str())
    }
}

/// `source, page N` label for citing a chunk; `Unknown` without a source
pub fn source_label(metadata: &Metadata) -> String {
    let source = metadata
        .get(keys::SOURCE)
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown");
    match metadata.get(keys::PAGE) {
        Some(serde_json::Value::String(page)) => format!("{}, page {}", source, page),
        Some(serde_json::Value::Number(page)) => format!("{}, page {}", source, page),
        _ => source.to_string(),
    }
}

/// Ingestion collaborator - produces the documents to index
#[async_trait::async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Loader type identifier (e.g., "pdf")
    fn loader_type(&self) -> &'static str;

    /// Load every document from the source
    async fn load(&self) -> Result<Vec<Document>>;
}
