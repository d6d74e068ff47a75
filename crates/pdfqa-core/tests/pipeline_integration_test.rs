//! End-to-end pipeline test over an on-disk SQLite store
//!
//! Tests:
//! 1. Bootstrap ingests into an empty store and is skipped afterwards
//! 2. Questions are answered from the closest chunks, with sources
//! 3. Metadata filters restrict retrieval
//! 4. A chunk searched with its own vector comes back first

use async_trait::async_trait;
use pdfqa_core::config::VectorStoreConfig;
use pdfqa_core::providers::keys;
use pdfqa_core::{
    CollectionStore, Document, DocumentChunker, DocumentLoader, Embedder, Generator,
    MetadataFilter, RagPipeline, Result, RetrievalConfig, SearchOptions, VectorStore,
    NO_RELEVANT_INFORMATION,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DIMS: usize = 32;

/// Bag-of-words embedder: each lowercase word bumps one bucket
struct BagOfWordsEmbedder;

fn bucket(word: &str) -> usize {
    word.bytes()
        .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
        % DIMS
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIMS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Echoes the first context line so tests can see which chunk led
#[derive(Default)]
struct EchoGenerator {
    answers: AtomicUsize,
    contexts: Mutex<Vec<String>>,
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn rewrite_query(&self, query: &str, _num_variants: usize) -> Result<Vec<String>> {
        Ok(vec![format!("{} details", query)])
    }

    async fn generate_answer(&self, _query: &str, context: &str) -> Result<String> {
        self.answers.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.to_string());
        Ok(context.lines().next().unwrap_or_default().to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct FixedLoader {
    documents: Vec<Document>,
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentLoader for FixedLoader {
    fn loader_type(&self) -> &'static str {
        "fixed"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.clone())
    }
}

fn page(source: &str, page: usize, text: &str) -> Document {
    Document::new(text)
        .with_metadata(keys::SOURCE, source)
        .with_metadata(keys::PAGE, page)
        .with_metadata(keys::TOTAL_PAGES, 3)
}

fn loader() -> FixedLoader {
    FixedLoader {
        documents: vec![
            page(
                "pdf_files/warranty.pdf",
                0,
                "Warranty coverage lasts twenty four months from purchase.",
            ),
            page(
                "pdf_files/warranty.pdf",
                1,
                "Warranty claims require the original receipt and serial number.",
            ),
            page(
                "pdf_files/cooking.pdf",
                2,
                "Simmer tomatoes with garlic and basil for forty minutes.",
            ),
        ],
        calls: AtomicUsize::new(0),
    }
}

fn build(store: Arc<CollectionStore>, generator: Arc<EchoGenerator>) -> RagPipeline {
    RagPipeline::builder()
        .embedder(Arc::new(BagOfWordsEmbedder))
        .store(store)
        .generator(generator)
        .chunker(DocumentChunker::new(500, 50).unwrap())
        .retrieval(RetrievalConfig {
            top_k: 3,
            score_threshold: 0.1,
            num_query_variants: 1,
            max_context_chunks: 2,
        })
        .build()
        .unwrap()
}

fn store_config(dir: &tempfile::TempDir) -> VectorStoreConfig {
    VectorStoreConfig {
        collection: "pdf_documents".to_string(),
        persist_directory: dir.path().join("vector_store"),
    }
}

#[tokio::test]
async fn test_bootstrap_is_idempotent_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let loader = loader();

    let store = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let pipeline = build(store, Arc::new(EchoGenerator::default()));
    let first = pipeline.bootstrap(&loader).await.unwrap();
    assert!(!first.skipped);
    assert_eq!(first.documents, 3);
    assert_eq!(first.chunks, 3);
    drop(pipeline);

    let reopened = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let pipeline = build(reopened.clone(), Arc::new(EchoGenerator::default()));
    let second = pipeline.bootstrap(&loader).await.unwrap();

    assert!(second.skipped);
    assert_eq!(second.stored, 3);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    assert_eq!(reopened.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_answers_cite_closest_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let generator = Arc::new(EchoGenerator::default());
    let pipeline = build(store, generator.clone());
    pipeline.bootstrap(&loader()).await.unwrap();

    let answer = pipeline
        .run("How many months does warranty coverage last?")
        .await
        .unwrap();

    assert!(!answer.sources.is_empty());
    assert!(answer.sources.len() <= 2);
    assert_eq!(
        answer.sources[0].metadata[keys::SOURCE],
        serde_json::json!("pdf_files/warranty.pdf")
    );
    assert_eq!(answer.answer, "[Source: pdf_files/warranty.pdf, page 0]");

    let ids: std::collections::HashSet<&str> =
        answer.sources.iter().map(|s| s.chunk_id.as_str()).collect();
    assert_eq!(ids.len(), answer.sources.len(), "sources are deduplicated");
    assert_eq!(generator.answers.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unrelated_question_finds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let generator = Arc::new(EchoGenerator::default());
    let pipeline = build(store, generator.clone());

    let answer = pipeline.run("Anything at all?").await.unwrap();

    assert_eq!(answer.answer, NO_RELEVANT_INFORMATION);
    assert!(answer.sources.is_empty());
    assert_eq!(generator.answers.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_filters_restrict_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let pipeline = build(store, Arc::new(EchoGenerator::default()));
    pipeline.bootstrap(&loader()).await.unwrap();

    let options = SearchOptions {
        top_k: 5,
        score_threshold: -1.0,
        filter: Some(MetadataFilter::eq(keys::PAGE, 2)),
    };
    let results = pipeline
        .retriever()
        .retrieve("warranty coverage", &options)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].metadata[keys::PAGE], serde_json::json!(2));
    assert_eq!(results[0].rank, 1);

    let options = SearchOptions {
        filter: Some(MetadataFilter::Gte(keys::PAGE.to_string(), 1.0)),
        ..options
    };
    let results = pipeline
        .retriever()
        .retrieve("warranty coverage", &options)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_own_vector_ranks_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CollectionStore::open(&store_config(&dir)).unwrap());
    let pipeline = build(store.clone(), Arc::new(EchoGenerator::default()));
    pipeline.bootstrap(&loader()).await.unwrap();

    let embedder = BagOfWordsEmbedder;
    let text = "Warranty claims require the original receipt and serial number.";
    let vector = embedder.embed(text).await.unwrap();

    let hits = store.similarity_search(&vector, 3, None).await.unwrap();
    assert_eq!(hits[0].content, text);
    assert!(hits[0].distance.abs() < 1e-5);
}
