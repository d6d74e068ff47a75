//! HTTP-based embedder using external LLM service

use super::cache::{embedding_cache_key, EmbeddingCache};
use super::{Embedder, LLMClient, VLLMClient};
use crate::config::LLMServiceConfig;
use crate::error::{PdfQaError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const PROBE_TEXT: &str = "dimension probe";

/// Embedder that uses external HTTP service (vLLM, TEI, OpenAI, etc.)
///
/// Vectors are L2-normalized so cosine similarity reduces to a dot product.
pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
    dimensions: usize,
    batch_size: usize,
    cache: EmbeddingCache,
}

impl HttpEmbedder {
    /// Create from LLM client with a known dimension
    pub fn new(client: Arc<dyn LLMClient>, dimensions: usize, batch_size: usize) -> Self {
        Self {
            client,
            dimensions,
            batch_size: batch_size.max(1),
            cache: EmbeddingCache::new(),
        }
    }

    /// Connect to the service described by `config` and detect the dimension
    pub async fn connect(config: LLMServiceConfig) -> Result<Self> {
        let batch_size = config.embedding_batch_size;
        let expected = config.embedding_dimensions;
        let client = Arc::new(VLLMClient::new(config)?);
        let embedder = Self::probe(client, batch_size).await?;

        if let Some(expected) = expected {
            if expected != embedder.dimensions {
                return Err(PdfQaError::Config(format!(
                    "Configured embedding_dimensions ({}) does not match service ({})",
                    expected, embedder.dimensions
                )));
            }
        }

        Ok(embedder)
    }

    /// Embed a probe text through `client` to learn the vector dimension
    pub async fn probe(client: Arc<dyn LLMClient>, batch_size: usize) -> Result<Self> {
        let vectors = client
            .embed_batch(&[PROBE_TEXT.to_string()])
            .await
            .map_err(|e| {
                PdfQaError::Llm(format!(
                    "Embedding model '{}' failed to initialize: {}",
                    client.embedding_model(),
                    e
                ))
            })?;

        let dimensions = vectors.first().map(|v| v.len()).unwrap_or(0);
        if dimensions == 0 {
            return Err(PdfQaError::Llm(format!(
                "Embedding model '{}' returned an empty probe vector",
                client.embedding_model()
            )));
        }

        tracing::info!(
            "Embedding model loaded | model={} | dimensions={}",
            client.embedding_model(),
            dimensions
        );

        Ok(Self::new(client, dimensions, batch_size))
    }

    async fn embed_uncached(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = self.client.embed_batch(texts).await?;

        if vectors.len() != texts.len() {
            return Err(PdfQaError::Llm(format!(
                "Embedding service returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        for vector in vectors.iter_mut() {
            if vector.len() != self.dimensions {
                return Err(PdfQaError::Llm(format!(
                    "Embedding dimension changed: expected {}, got {}",
                    self.dimensions,
                    vector.len()
                )));
            }
            l2_normalize(vector);
        }

        Ok(vectors)
    }
}

/// Scale a vector to unit length; zero vectors are left untouched
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = embedding_cache_key(self.client.embedding_model(), text);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Query embedding cache hit");
            return Ok(cached);
        }

        let vector = self
            .embed_uncached(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PdfQaError::Llm("No embedding returned".to_string()))?;

        self.cache.insert(key, vector.clone());
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all = Vec::with_capacity(texts.len());
        let total_batches = texts.len().div_ceil(self.batch_size);

        for (idx, batch) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!("Embedding batch {}/{}", idx + 1, total_batches);
            all.extend(self.embed_uncached(batch).await?);
        }

        Ok(all)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        self.client.embedding_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, CompletionOptions};
    use std::sync::Mutex;

    /// Returns `[len, 1, 0]` per text and records batch sizes
    #[derive(Default)]
    struct RecordingClient {
        batches: Mutex<Vec<usize>>,
        drop_one: bool,
        fail: bool,
    }

    #[async_trait]
    impl LLMClient for RecordingClient {
        async fn chat_completion(
            &self,
            _messages: Vec<ChatMessage>,
            _options: CompletionOptions,
        ) -> Result<String> {
            Ok(String::new())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.fail {
                return Err(PdfQaError::ExternalError("connection refused".into()));
            }
            self.batches.lock().unwrap().push(texts.len());
            let mut out: Vec<Vec<f32>> = texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.0])
                .collect();
            if self.drop_one {
                out.pop();
            }
            Ok(out)
        }

        fn model_name(&self) -> &str {
            "chat"
        }

        fn embedding_model(&self) -> &str {
            "embed"
        }
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_probe_detects_dimensions() {
        let client = Arc::new(RecordingClient::default());
        let embedder = HttpEmbedder::probe(client, 8).await.unwrap();
        assert_eq!(embedder.dimensions(), 3);
        assert_eq!(embedder.model_name(), "embed");
    }

    #[tokio::test]
    async fn test_probe_failure_is_fatal() {
        let client = Arc::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let result = HttpEmbedder::probe(client, 8).await;
        assert!(matches!(result, Err(PdfQaError::Llm(_))));
    }

    #[tokio::test]
    async fn test_batches_and_normalizes_in_order() {
        let client = Arc::new(RecordingClient::default());
        let embedder = HttpEmbedder::new(client.clone(), 3, 2);

        let texts: Vec<String> = ["a", "bb", "ccc", "dddd", "eeeee"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let vectors = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(*client.batches.lock().unwrap(), vec![2, 2, 1]);
        assert_eq!(vectors.len(), 5);
        for (text, vector) in texts.iter().zip(&vectors) {
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
            let expected = text.len() as f32 / ((text.len() * text.len()) as f32 + 1.0).sqrt();
            assert!((vector[0] - expected).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_an_error() {
        let client = Arc::new(RecordingClient {
            drop_one: true,
            ..Default::default()
        });
        let embedder = HttpEmbedder::new(client, 3, 4);
        let result = embedder
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;
        assert!(matches!(result, Err(PdfQaError::Llm(_))));
    }

    #[tokio::test]
    async fn test_query_embeddings_are_cached() {
        let client = Arc::new(RecordingClient::default());
        let embedder = HttpEmbedder::new(client.clone(), 3, 4);

        let first = embedder.embed("what is rust").await.unwrap();
        let second = embedder.embed("what is rust").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.batches.lock().unwrap().len(), 1);
    }
}
