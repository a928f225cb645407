//! RAG response generation.

use super::context::source_url;
use super::AnswerComposer;
use crate::error::Result;
use crate::pipeline::{Match, RetrievalEngine};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// RAG engine for question answering.
pub struct RagEngine {
    retrieval: RetrievalEngine,
    composer: Arc<dyn AnswerComposer>,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(retrieval: RetrievalEngine, composer: Arc<dyn AnswerComposer>) -> Self {
        Self {
            retrieval,
            composer,
        }
    }

    /// Ask a single question and get a response.
    ///
    /// Retrieval errors propagate; composition always yields an answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str, top_k: usize) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let matches = self.retrieval.retrieve(question, top_k).await?;
        let answer = self.composer.compose(question, &matches).await;

        Ok(RagResponse {
            answer,
            sources: matches,
        })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    /// The composed answer.
    pub answer: String,
    /// Matches the answer was composed from, best first.
    pub sources: Vec<Match>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} #{} (score: {:.2})",
                    source.chunk.source_id, source.chunk.sequence_index, source.score
                ));
                if let Some(url) = source_url(&source.chunk.source_id) {
                    output.push_str(&format!("\n  {}", url));
                }
            }
        }

        output
    }
}
