//! Deterministic collaborators for unit tests

use crate::db::{MetadataFilter, StoreHit, VectorStore};
use crate::error::{PdfQaError, Result};
use crate::index::Chunk;
use crate::llm::{Embedder, Generator};
use crate::providers::{Document, DocumentLoader, Metadata};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Store hit with `source: doc.pdf` and `page: 1` metadata
pub fn hit(id: &str, distance: f32) -> StoreHit {
    let mut metadata = Metadata::new();
    metadata.insert("source".into(), "doc.pdf".into());
    metadata.insert("page".into(), 1.into());
    metadata.insert("chunk_id".into(), id.into());
    StoreHit {
        id: id.to_string(),
        content: format!("content {}", id),
        metadata,
        distance,
    }
}

/// Embedder returning a default vector, optionally routed per text
pub struct FixedEmbedder {
    default: Vec<f32>,
    routes: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    fail_all: bool,
    pub calls: AtomicUsize,
}

impl FixedEmbedder {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            default,
            routes: HashMap::new(),
            failing: HashSet::new(),
            fail_all: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new(vec![1.0, 0.0])
        }
    }

    pub fn route(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.routes.insert(text.to_string(), vector);
        self
    }

    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.failing.contains(text) {
            return Err(PdfQaError::Llm(format!("cannot embed '{}'", text)));
        }
        Ok(self
            .routes
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.default.len()
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Store answering searches from scripted hits keyed by query vector
pub struct ScriptedStore {
    default: Vec<StoreHit>,
    routes: Vec<(Vec<f32>, Vec<StoreHit>)>,
    initial_count: usize,
    added: Mutex<Vec<Chunk>>,
    add_calls: AtomicUsize,
    searches: Mutex<Vec<(usize, Option<MetadataFilter>)>>,
}

impl ScriptedStore {
    pub fn new(default: Vec<StoreHit>) -> Self {
        Self {
            default,
            routes: Vec::new(),
            initial_count: 0,
            added: Mutex::new(Vec::new()),
            add_calls: AtomicUsize::new(0),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, vector: Vec<f32>, hits: Vec<StoreHit>) -> Self {
        self.routes.push((vector, hits));
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.initial_count = count;
        self
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn added(&self) -> Vec<Chunk> {
        self.added.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn last_search(&self) -> Option<(usize, Option<MetadataFilter>)> {
        self.searches.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn add(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if chunks.len() != vectors.len() {
            return Err(PdfQaError::InvalidInput("length mismatch".into()));
        }
        self.added.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreHit>> {
        self.searches.lock().unwrap().push((top_k, filter.cloned()));
        let hits = self
            .routes
            .iter()
            .find(|(v, _)| v.as_slice() == vector)
            .map(|(_, hits)| hits.clone())
            .unwrap_or_else(|| self.default.clone());
        Ok(hits.into_iter().take(top_k).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.initial_count + self.added.lock().unwrap().len())
    }

    fn collection_name(&self) -> &str {
        "scripted"
    }
}

/// Refusal returned by a grounded [`StubGenerator`]
pub const I_DONT_KNOW: &str = "I don't know.";

/// Generator with canned rewrites and answers that records its inputs
pub struct StubGenerator {
    rewrites: std::result::Result<Vec<String>, String>,
    answer: std::result::Result<String, String>,
    grounded: bool,
    pub rewrite_calls: AtomicUsize,
    pub answer_calls: AtomicUsize,
    pub last_context: Mutex<Option<String>>,
}

impl StubGenerator {
    pub fn new(rewrites: &[&str], answer: &str) -> Self {
        Self {
            rewrites: Ok(rewrites.iter().map(|s| s.to_string()).collect()),
            answer: Ok(answer.to_string()),
            grounded: false,
            rewrite_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    pub fn failing_rewrites(mut self) -> Self {
        self.rewrites = Err("rewrite model unavailable".into());
        self
    }

    /// Answer only when the context contains the canned answer, else refuse
    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }

    pub fn failing_answers(mut self) -> Self {
        self.answer = Err("generation timed out".into());
        self
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }

    pub fn rewrite_calls(&self) -> usize {
        self.rewrite_calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn rewrite_query(&self, _query: &str, num_variants: usize) -> Result<Vec<String>> {
        self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
        match &self.rewrites {
            Ok(rewrites) => Ok(rewrites.iter().take(num_variants).cloned().collect()),
            Err(e) => Err(PdfQaError::Llm(e.clone())),
        }
    }

    async fn generate_answer(&self, _query: &str, context: &str) -> Result<String> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.to_string());
        let answer = self.answer.clone().map_err(PdfQaError::Llm)?;
        if self.grounded && (context.trim().is_empty() || !context.contains(&answer)) {
            return Ok(I_DONT_KNOW.to_string());
        }
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Loader returning fixed documents
pub struct StubLoader {
    documents: std::result::Result<Vec<Document>, String>,
    pub calls: AtomicUsize,
}

impl StubLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Ok(documents),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            documents: Err("directory missing".into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentLoader for StubLoader {
    fn loader_type(&self) -> &'static str {
        "stub"
    }

    async fn load(&self) -> Result<Vec<Document>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents.clone().map_err(PdfQaError::InvalidInput)
    }
}
