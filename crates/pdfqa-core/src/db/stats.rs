//! Collection statistics

use super::Database;
use crate::error::Result;
use rusqlite::{params, OptionalExtension};

/// Collection stats
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub chunks: usize,
    pub sources: usize,
    pub dimensions: Option<usize>,
    pub created_at: Option<String>,
}

impl Database {
    /// Get statistics for one collection
    pub fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let conn = self.conn()?;

        let info: Option<(i64, String)> = conn
            .query_row(
                "SELECT dimensions, created_at FROM collections WHERE name = ?1",
                params![collection],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let chunks: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;

        let sources: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT json_extract(metadata, '$.source'))
                 FROM chunks WHERE collection = ?1 AND json_valid(metadata)",
                params![collection],
                |row| row.get(0),
            )
            .unwrap_or(0);

        Ok(CollectionStats {
            name: collection.to_string(),
            chunks: chunks as usize,
            sources: sources as usize,
            dimensions: info.as_ref().map(|(d, _)| *d as usize),
            created_at: info.map(|(_, c)| c),
        })
    }
}
