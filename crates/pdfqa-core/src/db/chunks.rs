//! Chunk storage and brute-force similarity search

use super::vectors::{bytes_to_embedding, cosine_distance, embedding_to_bytes};
use super::{Database, MetadataFilter, StoreHit};
use crate::error::{PdfQaError, Result};
use crate::index::Chunk;
use crate::providers::Metadata;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;

impl Database {
    /// Vector dimension recorded for a collection, if it has been written to
    pub fn collection_dimensions(&self, collection: &str) -> Result<Option<usize>> {
        let dims = self
            .conn()?
            .query_row(
                "SELECT dimensions FROM collections WHERE name = ?1",
                params![collection],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(dims.map(|d| d as usize))
    }

    /// Insert chunks with their vectors in one transaction
    ///
    /// Input is validated before anything is written; a duplicate `chunk_id`
    /// rolls back the whole batch.
    pub fn insert_chunks(
        &self,
        collection: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<usize> {
        if chunks.is_empty() && vectors.is_empty() {
            tracing::warn!("No chunks provided for insertion into '{}'", collection);
            return Ok(0);
        }

        let dimensions = validate_batch(chunks, vectors)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn()?;
        conn.execute("BEGIN IMMEDIATE", [])?;
        let result = (|| {
            let stored: Option<i64> = conn
                .query_row(
                    "SELECT dimensions FROM collections WHERE name = ?1",
                    params![collection],
                    |row| row.get(0),
                )
                .optional()?;

            match stored {
                Some(stored) if stored as usize != dimensions => {
                    return Err(PdfQaError::InvalidInput(format!(
                        "Vector dimension {} does not match collection '{}' dimension {}",
                        dimensions, collection, stored
                    )));
                }
                Some(_) => {}
                None => {
                    conn.execute(
                        "INSERT INTO collections (name, dimensions, created_at) VALUES (?1, ?2, ?3)",
                        params![collection, dimensions as i64, now],
                    )?;
                }
            }

            let mut exists = conn.prepare("SELECT 1 FROM chunks WHERE chunk_id = ?1")?;
            let mut insert = conn.prepare(
                "INSERT INTO chunks (chunk_id, collection, chunk_index, content, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for (chunk, vector) in chunks.iter().zip(vectors) {
                if exists.exists(params![chunk.chunk_id])? {
                    return Err(PdfQaError::DuplicateChunk(chunk.chunk_id.clone()));
                }

                let metadata = serde_json::to_string(&chunk.metadata)?;
                insert.execute(params![
                    chunk.chunk_id,
                    collection,
                    chunk.chunk_index as i64,
                    chunk.content,
                    metadata,
                    embedding_to_bytes(vector),
                    now,
                ])?;
            }

            Ok(chunks.len())
        })();

        let added = finish_transaction(&conn, result)?;
        tracing::info!(
            "Vectors added successfully | collection={} | count={}",
            collection,
            added
        );
        Ok(added)
    }

    /// Nearest chunks to `query` by cosine distance, ascending
    pub fn search_chunks(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<StoreHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let rows = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT chunk_id, content, metadata, embedding
                 FROM chunks
                 WHERE collection = ?1
                 ORDER BY chunk_index",
            )?;
            let rows = stmt
                .query_map(params![collection], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        let mut hits = Vec::new();
        for (id, content, metadata_json, embedding_bytes) in rows {
            let metadata: Metadata = match serde_json::from_str(&metadata_json) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping chunk {} with malformed metadata: {}", id, e);
                    continue;
                }
            };

            if let Some(filter) = filter {
                if !filter.matches(&metadata) {
                    continue;
                }
            }

            let embedding = bytes_to_embedding(&embedding_bytes);
            if embedding.len() != query.len() {
                tracing::warn!(
                    "Skipping chunk {} with {} dimensions (query has {})",
                    id,
                    embedding.len(),
                    query.len()
                );
                continue;
            }

            hits.push(StoreHit {
                distance: cosine_distance(query, &embedding),
                id,
                content,
                metadata,
            });
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);

        tracing::debug!(
            "Similarity search | collection={} | hits={}",
            collection,
            hits.len()
        );

        Ok(hits)
    }

    /// Number of chunks in a collection
    pub fn count_chunks(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Check batch preconditions, returning the shared vector dimension
fn validate_batch(chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<usize> {
    if chunks.len() != vectors.len() {
        return Err(PdfQaError::InvalidInput(format!(
            "Chunk count ({}) does not match vector count ({})",
            chunks.len(),
            vectors.len()
        )));
    }

    if let Some(position) = chunks.iter().position(|c| c.chunk_id.trim().is_empty()) {
        return Err(PdfQaError::InvalidInput(format!(
            "Chunk at position {} has no chunk_id",
            position
        )));
    }

    let dimensions = vectors[0].len();
    if dimensions == 0 {
        return Err(PdfQaError::InvalidInput("Vectors must not be empty".to_string()));
    }
    if let Some(position) = vectors.iter().position(|v| v.len() != dimensions) {
        return Err(PdfQaError::InvalidInput(format!(
            "Vector at position {} has {} dimensions, expected {}",
            position,
            vectors[position].len(),
            dimensions
        )));
    }

    let mut seen = HashSet::with_capacity(chunks.len());
    for chunk in chunks {
        if !seen.insert(chunk.chunk_id.as_str()) {
            return Err(PdfQaError::DuplicateChunk(chunk.chunk_id.clone()));
        }
    }

    Ok(dimensions)
}

/// Commit on success; roll back on failure, including a failed COMMIT
fn finish_transaction<T>(conn: &Connection, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => match conn.execute("COMMIT", []) {
            Ok(_) => Ok(value),
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e.into())
            }
        },
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}
