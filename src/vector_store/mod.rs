//! Vector index abstraction for Vidsage.
//!
//! Provides a trait-based interface for different vector database backends. An index
//! is created for one embedding dimension and one similarity metric and rejects
//! vectors of any other length.

mod memory;
mod sqlite;

pub use memory::MemoryVectorIndex;
pub use sqlite::SqliteVectorIndex;

use crate::config::Settings;
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// String metadata stored alongside each vector.
pub type Metadata = BTreeMap<String, String>;

/// Metadata key holding the source identifier.
pub const SOURCE_ID_KEY: &str = "source_id";
/// Metadata key holding the chunk's position within its source.
pub const SEQUENCE_INDEX_KEY: &str = "sequence_index";
/// Metadata key holding the chunk's start offset in the source text.
pub const CHAR_START_KEY: &str = "char_start";
/// Metadata key holding the chunk's end offset in the source text.
pub const CHAR_END_KEY: &str = "char_end";

/// One vector to write, with its payload text and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique entry id.
    pub id: String,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// Payload text.
    pub text: String,
    /// Arbitrary string metadata.
    pub metadata: Metadata,
}

impl IndexEntry {
    /// Source this entry belongs to, if recorded.
    pub fn source_id(&self) -> Option<&str> {
        self.metadata.get(SOURCE_ID_KEY).map(String::as_str)
    }

    /// Position within the source, if recorded.
    pub fn sequence_index(&self) -> Option<usize> {
        parse_usize(&self.metadata, SEQUENCE_INDEX_KEY)
    }
}

/// A query match with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Entry id.
    pub id: String,
    /// Payload text.
    pub text: String,
    /// Entry metadata.
    pub metadata: Metadata,
    /// Similarity score (higher is closer).
    pub score: f32,
}

/// Summary information about an indexed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    /// Source ID.
    pub source_id: String,
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// When the latest chunk for this source was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Similarity metric an index is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity in `[-1, 1]`.
    #[default]
    Cosine,
    /// Raw dot product.
    InnerProduct,
}

impl SimilarityMetric {
    /// Score two vectors of equal length.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::InnerProduct => inner_product(a, b),
        }
    }
}

impl std::str::FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cosine" => Ok(SimilarityMetric::Cosine),
            "inner_product" | "dot" | "ip" => Ok(SimilarityMetric::InnerProduct),
            _ => Err(format!("Unknown similarity metric: {}", s)),
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::Cosine => write!(f, "cosine"),
            SimilarityMetric::InnerProduct => write!(f, "inner_product"),
        }
    }
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored and queried vector must have.
    fn dimensions(&self) -> usize;

    /// Metric used to score queries.
    fn metric(&self) -> SimilarityMetric;

    /// Add entries. Either every entry is stored or none is.
    async fn add(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// Return up to `k` entries closest to `vector`, best first.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<IndexHit>>;

    /// Delete every entry of a source.
    async fn delete_source(&self, source_id: &str) -> Result<usize>;

    /// Replace every entry of a source with `entries`.
    async fn replace_source(&self, source_id: &str, entries: &[IndexEntry]) -> Result<usize> {
        self.delete_source(source_id).await?;
        self.add(entries).await
    }

    /// All entries of a source, ordered by sequence index.
    async fn get_source(&self, source_id: &str) -> Result<Vec<IndexEntry>>;

    /// List all indexed sources.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Total number of stored entries.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Compute the dot product of two vectors.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Sort hits by descending score, ties by ascending id, and keep the first `k`.
pub fn rank_hits(hits: &mut Vec<IndexHit>, k: usize) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(k);
}

/// Validate a batch before writing: dimensions, non-empty ids, no duplicate ids.
pub(crate) fn validate_entries(entries: &[IndexEntry], dimensions: usize) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for entry in entries {
        crate::embedding::check_dimensions(&entry.vector, dimensions)?;
        if entry.id.is_empty() {
            return Err(VidsageError::IndexWrite("entry id must not be empty".to_string()));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(VidsageError::IndexWrite(format!(
                "duplicate entry id in batch: {}",
                entry.id
            )));
        }
    }
    Ok(())
}

pub(crate) fn parse_usize(metadata: &Metadata, key: &str) -> Option<usize> {
    metadata.get(key).and_then(|v| v.parse().ok())
}

/// Create the index named by `settings.index.provider`.
pub fn create_index(settings: &Settings) -> Result<Arc<dyn VectorIndex>> {
    let dimensions = settings.embedding.dimensions as usize;
    let metric: SimilarityMetric = settings
        .index
        .metric
        .parse()
        .map_err(VidsageError::Config)?;

    match settings.index.provider.to_lowercase().as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorIndex::open(
            &settings.sqlite_path(),
            dimensions,
            metric,
        )?)),
        "memory" => Ok(Arc::new(MemoryVectorIndex::new(dimensions, metric))),
        other => Err(VidsageError::Config(format!(
            "Unknown index provider: {}. Use sqlite or memory.",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> IndexHit {
        IndexHit {
            id: id.to_string(),
            text: String::new(),
            metadata: Metadata::new(),
            score,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_inner_product_metric() {
        let metric = SimilarityMetric::InnerProduct;
        assert_eq!(metric.score(&[2.0, 1.0], &[3.0, 4.0]), 10.0);
        assert_eq!("dot".parse::<SimilarityMetric>().unwrap(), metric);
        assert_eq!(metric.to_string(), "inner_product");
    }

    #[test]
    fn test_rank_hits_breaks_ties_by_id() {
        let mut hits = vec![hit("c", 0.5), hit("a", 0.9), hit("b", 0.5), hit("d", 0.1)];
        rank_hits(&mut hits, 3);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_entries() {
        let entry = |id: &str, dims: usize| IndexEntry {
            id: id.to_string(),
            vector: vec![0.0; dims],
            text: "text".to_string(),
            metadata: Metadata::new(),
        };

        assert!(validate_entries(&[entry("a", 3), entry("b", 3)], 3).is_ok());
        assert!(matches!(
            validate_entries(&[entry("a", 3), entry("b", 2)], 3),
            Err(VidsageError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            validate_entries(&[entry("a", 3), entry("a", 3)], 3),
            Err(VidsageError::IndexWrite(_))
        ));
        assert!(validate_entries(&[entry("", 3)], 3).is_err());
    }
}
