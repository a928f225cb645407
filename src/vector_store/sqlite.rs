//! SQLite-based vector index implementation.
//!
//! Uses SQLite with similarity computed in Rust for simplicity. The index remembers
//! the dimension and metric it was created with and refuses to reopen with others.
//! For large datasets, consider the sqlite-vec extension or a dedicated vector database.

use super::{
    rank_hits, validate_entries, IndexEntry, IndexHit, IndexedSource, Metadata,
    SimilarityMetric, VectorIndex,
};
use crate::embedding::check_dimensions;
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS index_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        sequence_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_source_id ON chunks(source_id);
"#;

/// SQLite-based vector index.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
    dimensions: usize,
    metric: SimilarityMetric,
}

impl SqliteVectorIndex {
    /// Open (or create) an index file.
    #[instrument(skip_all)]
    pub fn open(path: &Path, dimensions: usize, metric: SimilarityMetric) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let index = Self::init(conn, dimensions, metric)?;
        info!("Opened SQLite vector index at {:?} ({} dims, {})", path, dimensions, metric);
        Ok(index)
    }

    /// Create an in-memory SQLite index (useful for testing).
    pub fn in_memory(dimensions: usize, metric: SimilarityMetric) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, dimensions, metric)
    }

    fn init(conn: Connection, dimensions: usize, metric: SimilarityMetric) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let stored_dims: Option<String> = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'dimensions'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let stored_metric: Option<String> = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'metric'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored_dims {
            Some(value) => {
                let expected: usize = value.parse().map_err(|_| {
                    VidsageError::Config(format!("Corrupt index dimension value: {}", value))
                })?;
                if expected != dimensions {
                    return Err(VidsageError::DimensionMismatch {
                        expected,
                        actual: dimensions,
                    });
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO index_meta (key, value) VALUES ('dimensions', ?1)",
                    params![dimensions.to_string()],
                )?;
            }
        }

        match stored_metric {
            Some(value) if value != metric.to_string() => {
                return Err(VidsageError::InvalidConfiguration(format!(
                    "index was created with the {} metric, not {}",
                    value, metric
                )));
            }
            Some(_) => {}
            None => {
                conn.execute(
                    "INSERT INTO index_meta (key, value) VALUES ('metric', ?1)",
                    params![metric.to_string()],
                )?;
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            dimensions,
            metric,
        })
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|e| format!("Failed to acquire lock: {}", e))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn insert_entries(tx: &Transaction<'_>, entries: &[IndexEntry]) -> rusqlite::Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO chunks
            (id, source_id, sequence_index, content, metadata_json, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )?;

        for entry in entries {
            let metadata_json = serde_json::to_string(&entry.metadata)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            stmt.execute(params![
                entry.id,
                entry.source_id().unwrap_or_default(),
                entry.sequence_index().map(|i| i as i64).unwrap_or(-1),
                entry.text,
                metadata_json,
                Self::embedding_to_bytes(&entry.vector),
                now,
            ])?;
        }

        Ok(())
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexEntry> {
        let metadata_json: String = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(3)?;
        let metadata: Metadata = serde_json::from_str(&metadata_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(IndexEntry {
            id: row.get(0)?,
            text: row.get(1)?,
            metadata,
            vector: Self::bytes_to_embedding(&embedding_bytes),
        })
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn add(&self, entries: &[IndexEntry]) -> Result<usize> {
        validate_entries(entries, self.dimensions)?;

        let conn = self.lock().map_err(VidsageError::IndexWrite)?;
        let write_err = |e: rusqlite::Error| VidsageError::IndexWrite(e.to_string());

        // Dropping the transaction without commit rolls the whole batch back.
        let tx = conn.unchecked_transaction().map_err(write_err)?;
        Self::insert_entries(&tx, entries).map_err(write_err)?;
        tx.commit().map_err(write_err)?;

        info!("Added {} entries", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, vector))]
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        check_dimensions(vector, self.dimensions)?;

        let conn = self.lock().map_err(VidsageError::IndexQuery)?;
        let query_err = |e: rusqlite::Error| VidsageError::IndexQuery(e.to_string());

        let mut stmt = conn
            .prepare("SELECT id, content, metadata_json, embedding FROM chunks")
            .map_err(query_err)?;

        let rows = stmt.query_map([], Self::row_to_entry).map_err(query_err)?;

        let mut hits = Vec::new();
        for row in rows {
            let entry = row.map_err(query_err)?;
            hits.push(IndexHit {
                score: self.metric.score(vector, &entry.vector),
                id: entry.id,
                text: entry.text,
                metadata: entry.metadata,
            });
        }

        rank_hits(&mut hits, k);

        debug!("Found {} matching entries", hits.len());
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn delete_source(&self, source_id: &str) -> Result<usize> {
        let conn = self.lock().map_err(VidsageError::IndexWrite)?;

        let deleted = conn
            .execute("DELETE FROM chunks WHERE source_id = ?1", params![source_id])
            .map_err(|e| VidsageError::IndexWrite(e.to_string()))?;

        info!("Deleted {} entries for source {}", deleted, source_id);
        Ok(deleted)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_source(&self, source_id: &str, entries: &[IndexEntry]) -> Result<usize> {
        validate_entries(entries, self.dimensions)?;

        let conn = self.lock().map_err(VidsageError::IndexWrite)?;
        let write_err = |e: rusqlite::Error| VidsageError::IndexWrite(e.to_string());

        let tx = conn.unchecked_transaction().map_err(write_err)?;
        let deleted = tx
            .execute("DELETE FROM chunks WHERE source_id = ?1", params![source_id])
            .map_err(write_err)?;
        Self::insert_entries(&tx, entries).map_err(write_err)?;
        tx.commit().map_err(write_err)?;

        info!(
            "Replaced {} entries for source {} with {}",
            deleted,
            source_id,
            entries.len()
        );
        Ok(entries.len())
    }

    #[instrument(skip(self))]
    async fn get_source(&self, source_id: &str) -> Result<Vec<IndexEntry>> {
        let conn = self.lock().map_err(VidsageError::IndexQuery)?;
        let query_err = |e: rusqlite::Error| VidsageError::IndexQuery(e.to_string());

        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, content, metadata_json, embedding
                FROM chunks
                WHERE source_id = ?1
                ORDER BY sequence_index, id
                "#,
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![source_id], Self::row_to_entry)
            .map_err(query_err)?;

        let entries = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_err)?;
        debug!("Found {} entries for source {}", entries.len(), source_id);
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock().map_err(VidsageError::IndexQuery)?;
        let query_err = |e: rusqlite::Error| VidsageError::IndexQuery(e.to_string());

        let mut stmt = conn
            .prepare(
                r#"
                SELECT source_id, COUNT(*) AS chunk_count, MAX(indexed_at) AS indexed_at
                FROM chunks
                GROUP BY source_id
                ORDER BY indexed_at DESC, source_id
                "#,
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let chunk_count: i64 = row.get(1)?;
                let indexed_at: String = row.get(2)?;
                Ok(IndexedSource {
                    source_id: row.get(0)?,
                    chunk_count: chunk_count as usize,
                    indexed_at: Self::parse_timestamp(&indexed_at),
                })
            })
            .map_err(query_err)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(query_err)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.lock().map_err(VidsageError::IndexQuery)?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| VidsageError::IndexQuery(e.to_string()))?;
        Ok(count as usize)
    }
}
