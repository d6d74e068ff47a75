//! Query embedding cache to avoid re-embedding repeated questions

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

#[derive(Clone)]
struct CacheEntry {
    vector: Vec<f32>,
    expires_at: SystemTime,
}

/// In-memory embedding cache with TTL
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl EmbeddingCache {
    /// Create new cache with default TTL of 1 hour
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Create cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get cached vector if present and not expired
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.vector.clone())
        } else {
            None
        }
    }

    /// Store a vector, evicting expired entries on the way
    pub fn insert(&self, key: String, vector: Vec<f32>) {
        let now = SystemTime::now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| now < entry.expires_at);
            entries.insert(
                key,
                CacheEntry {
                    vector,
                    expires_at: now + self.ttl,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate cache key for an embedding
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("embed:{:x}", hasher.finalize())
}
