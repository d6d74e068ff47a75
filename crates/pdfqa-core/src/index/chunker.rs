//! Document chunking for embedding
//!
//! Splits documents recursively on a ladder of separators (paragraph, line,
//! word, character) and merges the pieces back into spans of at most
//! `chunk_size` characters, repeating up to `chunk_overlap` characters between
//! consecutive spans of the same document.

use crate::config::ChunkingConfig;
use crate::error::{PdfQaError, Result};
use crate::providers::{keys, Document, Metadata};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Separators tried in priority order; the empty separator slices characters
pub const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Document chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique id (UUID v4), assigned at creation
    pub chunk_id: String,
    /// Position among all chunks produced by the same `split` call
    pub chunk_index: usize,
    pub content: String,
    /// Parent document metadata plus `chunk_id` and `chunk_index`
    pub metadata: Metadata,
}

/// Recursive character splitter
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentChunker {
    /// Create a chunker; `chunk_overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PdfQaError::Config("chunk_size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(PdfQaError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        tracing::info!(
            "Initialized DocumentChunker | chunk_size={} | chunk_overlap={}",
            chunk_size,
            chunk_overlap
        );
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split documents into chunks, enriching each with `chunk_id` and `chunk_index`
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        if documents.is_empty() {
            tracing::warn!("No documents provided for chunking");
            return Vec::new();
        }

        tracing::info!("Starting document chunking | documents={}", documents.len());

        let mut chunks = Vec::new();
        for document in documents {
            for content in self.split_text(&document.content) {
                let chunk_index = chunks.len();
                let chunk_id = uuid::Uuid::new_v4().to_string();

                let mut metadata = document.metadata.clone();
                metadata.insert(keys::CHUNK_ID.to_string(), chunk_id.clone().into());
                metadata.insert(keys::CHUNK_INDEX.to_string(), chunk_index.into());

                chunks.push(Chunk {
                    chunk_id,
                    chunk_index,
                    content,
                    metadata,
                });
            }
        }

        tracing::info!(
            "Chunking complete | input_docs={} | output_chunks={}",
            documents.len(),
            chunks.len()
        );

        chunks
    }

    /// Split a single text into trimmed, non-empty spans
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; the empty separator always applies
        let (position, separator) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
            .map(|(i, sep)| (i, *sep))
            .unwrap_or((separators.len().saturating_sub(1), ""));
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let pieces = split_on(text, separator);

        let mut output = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                output.extend(self.merge(&fitting, separator));
                fitting.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    output.push(trimmed.to_string());
                }
            } else {
                output.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            output.extend(self.merge(&fitting, separator));
        }

        output
    }

    /// Greedily merge small pieces into spans, carrying overlap forward
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut spans = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + len + joiner > self.chunk_size {
                if !current.is_empty() {
                    push_span(&mut spans, &current, separator);

                    // Drop from the front until only the overlap remains and the
                    // next piece fits
                    while total > self.chunk_overlap
                        || (total > 0
                            && total
                                + len
                                + if current.is_empty() { 0 } else { separator_len }
                                > self.chunk_size)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        total -= char_len(front)
                            + if current.is_empty() { 0 } else { separator_len };
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        push_span(&mut spans, &current, separator);
        spans
    }
}

fn push_span(spans: &mut Vec<String>, pieces: &VecDeque<&str>, separator: &str) {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        spans.push(trimmed.to_string());
    }
}

/// Split on a separator; the empty separator yields single characters
fn split_on<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
