//! Embedding generation for semantic search and retrieval.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::Settings;
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    ///
    /// The default implementation calls [`Embedder::embed`] once per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Fail with `DimensionMismatch` unless `vector` has `expected` components.
pub fn check_dimensions(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(VidsageError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Create the embedder named by `settings.embedding.provider`.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let dimensions = settings.embedding.dimensions as usize;
    match settings.embedding.provider.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(
            OpenAIEmbedder::with_config(&settings.embedding.model, dimensions)?
                .with_batch_size(settings.embedding.batch_size),
        )),
        "hash" | "local" => Ok(Arc::new(HashEmbedder::new(dimensions)?)),
        other => Err(VidsageError::Config(format!(
            "Unknown embedding provider: {}. Use openai or hash.",
            other
        ))),
    }
}
