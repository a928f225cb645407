//! Retrieval: embed a query and return the best-matching chunks.

use super::Match;
use crate::embedding::{check_dimensions, Embedder};
use crate::error::{Result, VidsageError};
use crate::vector_store::{rank_hits, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Query → ranked chunks.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    min_score: Option<f32>,
}

impl RetrievalEngine {
    /// Create an engine. The embedder must produce vectors the index accepts.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Result<Self> {
        if embedder.dimensions() != index.dimensions() {
            return Err(VidsageError::DimensionMismatch {
                expected: index.dimensions(),
                actual: embedder.dimensions(),
            });
        }

        Ok(Self {
            embedder,
            index,
            min_score: None,
        })
    }

    /// Drop matches scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Return at most `top_k` matches, highest score first, ties by chunk id.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Match>> {
        if query.trim().is_empty() {
            return Err(VidsageError::EmptyQuery);
        }
        if top_k == 0 {
            return Err(VidsageError::InvalidConfiguration(
                "top_k must be at least 1".to_string(),
            ));
        }

        let vector = self.embedder.embed(query).await?;
        check_dimensions(&vector, self.index.dimensions())?;

        let mut hits = self.index.query(&vector, top_k).await?;
        if let Some(min_score) = self.min_score {
            hits.retain(|hit| hit.score >= min_score);
        }
        rank_hits(&mut hits, top_k);

        debug!("Retrieved {} matches", hits.len());
        hits.into_iter().map(Match::try_from).collect()
    }
}
