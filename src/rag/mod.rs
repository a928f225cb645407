//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! An [`AnswerComposer`] turns a question and its ranked matches into an answer.
//! Composition never fails: generating composers fall back to the extractive one.

pub mod context;
mod composer;
mod generator;
mod response;

pub use composer::{ExtractiveComposer, GeneratingComposer};
pub use generator::{AnswerGenerator, OpenAIGenerator};
pub use response::{RagEngine, RagResponse};

use crate::pipeline::Match;
use async_trait::async_trait;

/// Answer returned when retrieval found nothing.
pub const NO_INFORMATION_MESSAGE: &str =
    "I couldn't find any relevant information in the indexed transcripts for this question.";

/// Turns ranked matches into a human-readable answer.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    /// Compose an answer to `question` from `matches`, best match first.
    async fn compose(&self, question: &str, matches: &[Match]) -> String;
}
