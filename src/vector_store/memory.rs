//! In-memory vector index implementation.
//!
//! Useful for testing and small, ephemeral datasets.

use super::{
    parse_usize, rank_hits, validate_entries, IndexEntry, IndexHit, IndexedSource,
    SimilarityMetric, VectorIndex, SEQUENCE_INDEX_KEY,
};
use crate::embedding::check_dimensions;
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

struct StoredEntry {
    entry: IndexEntry,
    indexed_at: DateTime<Utc>,
}

/// In-memory vector index.
pub struct MemoryVectorIndex {
    dimensions: usize,
    metric: SimilarityMetric,
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryVectorIndex {
    /// Create an empty in-memory index.
    pub fn new(dimensions: usize, metric: SimilarityMetric) -> Self {
        Self {
            dimensions,
            metric,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn insert_all(
        store: &mut HashMap<String, StoredEntry>,
        entries: &[IndexEntry],
    ) -> Result<usize> {
        if let Some(existing) = entries.iter().find(|e| store.contains_key(&e.id)) {
            return Err(VidsageError::IndexWrite(format!(
                "entry id already exists: {}",
                existing.id
            )));
        }

        let now = Utc::now();
        for entry in entries {
            store.insert(
                entry.id.clone(),
                StoredEntry {
                    entry: entry.clone(),
                    indexed_at: now,
                },
            );
        }
        Ok(entries.len())
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    async fn add(&self, entries: &[IndexEntry]) -> Result<usize> {
        validate_entries(entries, self.dimensions)?;

        let mut store = self
            .entries
            .write()
            .map_err(|e| VidsageError::IndexWrite(format!("Failed to acquire lock: {}", e)))?;

        Self::insert_all(&mut store, entries)
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        check_dimensions(vector, self.dimensions)?;

        let store = self
            .entries
            .read()
            .map_err(|e| VidsageError::IndexQuery(format!("Failed to acquire lock: {}", e)))?;

        let mut hits: Vec<IndexHit> = store
            .values()
            .map(|stored| IndexHit {
                id: stored.entry.id.clone(),
                text: stored.entry.text.clone(),
                metadata: stored.entry.metadata.clone(),
                score: self.metric.score(vector, &stored.entry.vector),
            })
            .collect();

        rank_hits(&mut hits, k);
        Ok(hits)
    }

    async fn delete_source(&self, source_id: &str) -> Result<usize> {
        let mut store = self
            .entries
            .write()
            .map_err(|e| VidsageError::IndexWrite(format!("Failed to acquire lock: {}", e)))?;

        let initial_len = store.len();
        store.retain(|_, stored| stored.entry.source_id() != Some(source_id));
        Ok(initial_len - store.len())
    }

    async fn replace_source(&self, source_id: &str, entries: &[IndexEntry]) -> Result<usize> {
        validate_entries(entries, self.dimensions)?;

        let mut store = self
            .entries
            .write()
            .map_err(|e| VidsageError::IndexWrite(format!("Failed to acquire lock: {}", e)))?;

        // Ids of the replaced source are about to be freed; any other clash aborts
        // before the map is touched.
        let clash = entries.iter().find(|e| {
            store
                .get(&e.id)
                .is_some_and(|stored| stored.entry.source_id() != Some(source_id))
        });
        if let Some(existing) = clash {
            return Err(VidsageError::IndexWrite(format!(
                "entry id already exists: {}",
                existing.id
            )));
        }

        store.retain(|_, stored| stored.entry.source_id() != Some(source_id));
        Self::insert_all(&mut store, entries)
    }

    async fn get_source(&self, source_id: &str) -> Result<Vec<IndexEntry>> {
        let store = self
            .entries
            .read()
            .map_err(|e| VidsageError::IndexQuery(format!("Failed to acquire lock: {}", e)))?;

        let mut result: Vec<IndexEntry> = store
            .values()
            .filter(|stored| stored.entry.source_id() == Some(source_id))
            .map(|stored| stored.entry.clone())
            .collect();
        result.sort_by_key(|e| parse_usize(&e.metadata, SEQUENCE_INDEX_KEY));
        Ok(result)
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let store = self
            .entries
            .read()
            .map_err(|e| VidsageError::IndexQuery(format!("Failed to acquire lock: {}", e)))?;

        let mut source_map: HashMap<String, IndexedSource> = HashMap::new();

        for stored in store.values() {
            let source_id = stored.entry.source_id().unwrap_or_default().to_string();
            let entry = source_map
                .entry(source_id.clone())
                .or_insert_with(|| IndexedSource {
                    source_id,
                    chunk_count: 0,
                    indexed_at: stored.indexed_at,
                });

            entry.chunk_count += 1;
            if stored.indexed_at > entry.indexed_at {
                entry.indexed_at = stored.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = source_map.into_values().collect();
        sources.sort_by(|a, b| {
            b.indexed_at
                .cmp(&a.indexed_at)
                .then_with(|| a.source_id.cmp(&b.source_id))
        });

        Ok(sources)
    }

    async fn count(&self) -> Result<usize> {
        let store = self
            .entries
            .read()
            .map_err(|e| VidsageError::IndexQuery(format!("Failed to acquire lock: {}", e)))?;
        Ok(store.len())
    }
}
