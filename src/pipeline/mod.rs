//! Ingestion and retrieval over a vector index.
//!
//! Both orchestrators are stateless: every persisted chunk lives in the injected
//! [`VectorIndex`](crate::vector_store::VectorIndex). They receive their collaborators
//! at construction time, so tests can swap in doubles.

mod ingest;
mod retrieve;

pub use ingest::{IngestMode, IngestReport, IngestionPipeline};
pub use retrieve::RetrievalEngine;

use crate::error::{Result, VidsageError};
use crate::vector_store::{
    parse_usize, IndexHit, Metadata, CHAR_END_KEY, CHAR_START_KEY, SEQUENCE_INDEX_KEY,
    SOURCE_ID_KEY,
};
use serde::{Deserialize, Serialize};

/// One source document to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Externally supplied identifier (e.g. a video id).
    pub source_id: String,
    /// Full transcript text.
    pub raw_text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// The unit of indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk id.
    pub chunk_id: String,
    /// Source this chunk was cut from.
    pub source_id: String,
    /// Position within the source, 0-based.
    pub sequence_index: usize,
    /// Chunk text.
    pub text: String,
    /// Byte offset of the chunk's start in the source text.
    pub char_start: usize,
    /// Byte offset of the chunk's end in the source text.
    pub char_end: usize,
}

impl Chunk {
    /// Metadata written to the index next to this chunk's vector.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_ID_KEY.to_string(), self.source_id.clone());
        metadata.insert(SEQUENCE_INDEX_KEY.to_string(), self.sequence_index.to_string());
        metadata.insert(CHAR_START_KEY.to_string(), self.char_start.to_string());
        metadata.insert(CHAR_END_KEY.to_string(), self.char_end.to_string());
        metadata
    }

    /// Rebuild a chunk from an index entry's id, text and metadata.
    pub fn from_parts(id: String, text: String, metadata: &Metadata) -> Result<Self> {
        let malformed = |key: &str| {
            VidsageError::IndexQuery(format!("entry {} has no valid {} metadata", id, key))
        };

        let source_id = metadata
            .get(SOURCE_ID_KEY)
            .cloned()
            .ok_or_else(|| malformed(SOURCE_ID_KEY))?;
        let sequence_index =
            parse_usize(metadata, SEQUENCE_INDEX_KEY).ok_or_else(|| malformed(SEQUENCE_INDEX_KEY))?;
        let char_start = parse_usize(metadata, CHAR_START_KEY).unwrap_or(0);
        let char_end = parse_usize(metadata, CHAR_END_KEY).unwrap_or(char_start + text.len());

        Ok(Self {
            chunk_id: id,
            source_id,
            sequence_index,
            text,
            char_start,
            char_end,
        })
    }
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is closer).
    pub score: f32,
}

impl TryFrom<IndexHit> for Match {
    type Error = VidsageError;

    fn try_from(hit: IndexHit) -> Result<Self> {
        Ok(Self {
            chunk: Chunk::from_parts(hit.id, hit.text, &hit.metadata)?,
            score: hit.score,
        })
    }
}
