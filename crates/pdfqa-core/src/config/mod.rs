//! Configuration management

use crate::error::{PdfQaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where the PDF corpus lives
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Chunking parameters
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Vector store location
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Retrieval and context assembly
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// HTTP service boundary
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source directory for the ingestion path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Root directory scanned for PDFs
    #[serde(default = "default_documents_dir")]
    pub directory: PathBuf,

    /// Glob pattern (relative to `directory`) for files to load
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            directory: default_documents_dir(),
            pattern: default_pattern(),
        }
    }
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("pdf_files")
}

fn default_pattern() -> String {
    "**/*.pdf".to_string()
}

/// Chunk size and overlap, both in characters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (query rewriting, answer generation)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (detected by probing the service if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// Texts per embeddings request
    #[serde(default = "default_batch_size")]
    pub embedding_batch_size: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token budget for generated answers
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("PDFQA_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("PDFQA_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("PDFQA_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            embedding_batch_size: default_batch_size(),
            api_key: std::env::var("PDFQA_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("PDFQA_LLM_MODEL")
        .unwrap_or_else(|_| "mistralai/Mistral-7B-Instruct-v0.3".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("PDFQA_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_batch_size() -> usize {
    32
}

fn default_timeout() -> u64 {
    30
}

fn default_max_new_tokens() -> u32 {
    300
}

/// Persistent vector store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Collection name inside the store
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory holding the store file
    #[serde(default = "default_persist_directory")]
    pub persist_directory: PathBuf,
}

impl VectorStoreConfig {
    /// Path of the SQLite file backing the store
    pub fn database_path(&self) -> PathBuf {
        self.persist_directory.join(crate::STORE_FILE_NAME)
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            persist_directory: default_persist_directory(),
        }
    }
}

fn default_collection() -> String {
    "pdf_documents".to_string()
}

fn default_persist_directory() -> PathBuf {
    PathBuf::from("data/vector_store")
}

/// Retrieval parameters used by the pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Nearest neighbours requested per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity (1 - cosine distance) kept
    #[serde(default)]
    pub score_threshold: f32,

    /// Rewritten variants requested from the generator (0 disables rewriting)
    #[serde(default = "default_num_query_variants")]
    pub num_query_variants: usize,

    /// Chunks kept in the generation context after deduplication
    #[serde(default = "default_max_context_chunks")]
    pub max_context_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: 0.0,
            num_query_variants: default_num_query_variants(),
            max_context_chunks: default_max_context_chunks(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_num_query_variants() -> usize {
    3
}

fn default_max_context_chunks() -> usize {
    5
}

/// Listen address for `pdfqa serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Optional log file in addition to stderr
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(PdfQaError::Config("chunk_size must be positive".into()));
        }
        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(PdfQaError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunking.chunk_overlap, chunking.chunk_size
            )));
        }

        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 {
            return Err(PdfQaError::Config("top_k must be positive".into()));
        }
        if retrieval.max_context_chunks == 0 {
            return Err(PdfQaError::Config(
                "max_context_chunks must be positive".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&retrieval.score_threshold) {
            return Err(PdfQaError::Config(format!(
                "score_threshold {} is outside [-1, 1]",
                retrieval.score_threshold
            )));
        }

        if self.llm_service.embedding_batch_size == 0 {
            return Err(PdfQaError::Config(
                "embedding_batch_size must be positive".into(),
            ));
        }
        if self.vector_store.collection.trim().is_empty() {
            return Err(PdfQaError::Config("collection name is empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.vector_store.collection, "pdf_documents");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.num_query_variants, 3);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
chunking:
  chunk_size: 500
retrieval:
  score_threshold: 0.3
vector_store:
  collection: manuals
llm_service:
  url: http://gpu-box:8000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert!((config.retrieval.score_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.max_context_chunks, 5);
        assert_eq!(config.vector_store.collection, "manuals");
        assert_eq!(config.llm_service.url, "http://gpu-box:8000");
        assert_eq!(config.llm_service.embedding_batch_size, 32);
        assert_eq!(config.llm_service.embeddings_url(), "http://gpu-box:8000");
    }

    #[test]
    fn test_validate_rejects_overlap_not_smaller_than_size() {
        let mut config = Config::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(PdfQaError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_retrieval() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retrieval.score_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retrieval.max_context_chunks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.retrieval.top_k = 9;
        config.documents.directory = PathBuf::from("/srv/pdfs");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.retrieval.top_k, 9);
        assert_eq!(loaded.documents.directory, PathBuf::from("/srv/pdfs"));
    }

    #[test]
    fn test_database_path() {
        let store = VectorStoreConfig {
            collection: "c".into(),
            persist_directory: PathBuf::from("/tmp/store"),
        };
        assert_eq!(
            store.database_path(),
            PathBuf::from("/tmp/store").join(crate::STORE_FILE_NAME)
        );
    }
}
