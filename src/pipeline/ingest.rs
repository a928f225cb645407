//! Ingestion: chunk, embed and index one source document.

use super::{Chunk, Document};
use crate::chunking::{chunk_text, ChunkingConfig};
use crate::embedding::{check_dimensions, Embedder};
use crate::error::{Result, VidsageError};
use crate::vector_store::{IndexEntry, VectorIndex};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// What happens to existing chunks when a source is ingested again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Always add new chunks; re-ingesting a source duplicates its chunks.
    #[default]
    Append,
    /// Replace every chunk of the source in one index operation.
    Upsert,
}

impl std::str::FromStr for IngestMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(IngestMode::Append),
            "upsert" | "replace" => Ok(IngestMode::Upsert),
            _ => Err(format!("Unknown ingest mode: {}", s)),
        }
    }
}

/// Result of ingesting one source.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Source ID.
    pub source_id: String,
    /// Number of chunks written.
    pub chunk_count: usize,
    /// Mode the source was written with.
    pub mode: IngestMode,
}

/// Chunk → embed → index for one source.
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunking: ChunkingConfig,
    mode: IngestMode,
    batch_size: usize,
    max_concurrent: usize,
}

impl IngestionPipeline {
    /// Create a pipeline. Fails if the chunking configuration is invalid or the
    /// embedder and index disagree on dimensionality.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chunking: ChunkingConfig,
    ) -> Result<Self> {
        chunking.validate()?;
        if embedder.dimensions() != index.dimensions() {
            return Err(VidsageError::DimensionMismatch {
                expected: index.dimensions(),
                actual: embedder.dimensions(),
            });
        }

        Ok(Self {
            embedder,
            index,
            chunking,
            mode: IngestMode::Append,
            batch_size: 100,
            max_concurrent: 1,
        })
    }

    /// Set the re-ingestion mode.
    pub fn with_mode(mut self, mode: IngestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set how many chunks go into one embedding call and how many calls may be
    /// in flight at once.
    pub fn with_batching(mut self, batch_size: usize, max_concurrent: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// The chunking configuration in use.
    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    /// Chunk `raw_text` and assign ids and sequence indices.
    pub fn prepare(&self, source_id: &str, raw_text: &str) -> Result<Vec<Chunk>> {
        if source_id.trim().is_empty() {
            return Err(VidsageError::InvalidInput(
                "source id must not be empty".to_string(),
            ));
        }

        let pieces = chunk_text(raw_text, &self.chunking)?;
        if pieces.is_empty() {
            return Err(VidsageError::EmptyContent(format!(
                "source {} produced no chunks",
                source_id
            )));
        }

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(sequence_index, piece)| Chunk {
                chunk_id: Uuid::new_v4().to_string(),
                source_id: source_id.to_string(),
                sequence_index,
                text: piece.text,
                char_start: piece.char_start,
                char_end: piece.char_end,
            })
            .collect())
    }

    /// Ingest one document.
    pub async fn ingest_document(&self, document: &Document) -> Result<IngestReport> {
        self.ingest(&document.source_id, &document.raw_text).await
    }

    /// Chunk, embed and index `raw_text` under `source_id`.
    ///
    /// Either every chunk is written or none is.
    #[instrument(skip(self, raw_text), fields(source_id = %source_id, len = raw_text.len()))]
    pub async fn ingest(&self, source_id: &str, raw_text: &str) -> Result<IngestReport> {
        // Ids and sequence indices are fixed here, before any embedding call runs.
        let chunks = self.prepare(source_id, raw_text)?;
        info!("Chunked {} into {} chunks", source_id, chunks.len());

        let vectors = self.embed_chunks(&chunks).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                metadata: chunk.metadata(),
                id: chunk.chunk_id,
                text: chunk.text,
                vector,
            })
            .collect();

        let chunk_count = match self.mode {
            IngestMode::Append => self.index.add(&entries).await?,
            IngestMode::Upsert => self.index.replace_source(source_id, &entries).await?,
        };

        info!("Indexed {} chunks for {}", chunk_count, source_id);
        Ok(IngestReport {
            source_id: source_id.to_string(),
            chunk_count,
            mode: self.mode,
        })
    }

    /// Embed chunk texts in batches; results keep chunk order whatever order the
    /// calls complete in.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let batches: Vec<Vec<String>> = chunks
            .chunks(self.batch_size)
            .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
            .collect();
        debug!(
            "Embedding {} chunks in {} batches (max {} concurrent)",
            chunks.len(),
            batches.len(),
            self.max_concurrent
        );

        let embedder = &self.embedder;
        let results: Vec<Vec<Vec<f32>>> = stream::iter(batches)
            .map(|batch| async move {
                let vectors = embedder.embed_batch(&batch).await?;
                if vectors.len() != batch.len() {
                    return Err(VidsageError::EmbeddingUnavailable(format!(
                        "expected {} embeddings, received {}",
                        batch.len(),
                        vectors.len()
                    )));
                }
                Ok(vectors)
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        let vectors: Vec<Vec<f32>> = results.into_iter().flatten().collect();
        let expected = self.index.dimensions();
        for vector in &vectors {
            check_dimensions(vector, expected)?;
        }

        Ok(vectors)
    }
}
