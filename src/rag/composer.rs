//! Answer composers.

use super::context::format_context_for_prompt;
use super::{AnswerComposer, AnswerGenerator, NO_INFORMATION_MESSAGE};
use crate::pipeline::Match;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const EXTRACTIVE_PREFIX: &str = "Based on the transcript:\n\n";

/// Deterministic composer: concatenates the top passages.
#[derive(Debug, Clone)]
pub struct ExtractiveComposer {
    separator: String,
    max_chars: usize,
}

impl ExtractiveComposer {
    /// Create a composer joining passages with `separator` and cutting the body
    /// at `max_chars` characters.
    pub fn new(separator: impl Into<String>, max_chars: usize) -> Self {
        Self {
            separator: separator.into(),
            max_chars,
        }
    }

    /// Compose without going through the async trait.
    pub fn compose_now(&self, matches: &[Match]) -> String {
        if matches.is_empty() {
            return NO_INFORMATION_MESSAGE.to_string();
        }

        let body = matches
            .iter()
            .map(|m| m.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator);

        let body = match body.char_indices().nth(self.max_chars) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body,
        };

        format!("{}{}", EXTRACTIVE_PREFIX, body)
    }
}

impl Default for ExtractiveComposer {
    fn default() -> Self {
        Self::new("\n\n", 2000)
    }
}

#[async_trait]
impl AnswerComposer for ExtractiveComposer {
    async fn compose(&self, _question: &str, matches: &[Match]) -> String {
        self.compose_now(matches)
    }
}

/// Composer that asks an [`AnswerGenerator`] to write the answer and falls back to
/// extractive composition when generation fails.
pub struct GeneratingComposer {
    generator: Arc<dyn AnswerGenerator>,
    fallback: ExtractiveComposer,
}

impl GeneratingComposer {
    pub fn new(generator: Arc<dyn AnswerGenerator>, fallback: ExtractiveComposer) -> Self {
        Self {
            generator,
            fallback,
        }
    }
}

#[async_trait]
impl AnswerComposer for GeneratingComposer {
    async fn compose(&self, question: &str, matches: &[Match]) -> String {
        if matches.is_empty() {
            return NO_INFORMATION_MESSAGE.to_string();
        }

        let context = format_context_for_prompt(matches);
        match self.generator.generate(question, &context).await {
            Ok(answer) if !answer.trim().is_empty() => {
                debug!("Generated answer from {} passages", matches.len());
                answer
            }
            Ok(_) => {
                warn!("Answer generation returned nothing, using extractive answer");
                self.fallback.compose_now(matches)
            }
            Err(e) => {
                warn!("Answer generation failed, using extractive answer: {}", e);
                self.fallback.compose_now(matches)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, VidsageError};
    use crate::rag::context::tests::sample_match;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingGenerator;

    #[async_trait]
    impl AnswerGenerator for FailingGenerator {
        async fn generate(&self, _question: &str, _context: &str) -> Result<String> {
            Err(VidsageError::Generation("rate limited".to_string()))
        }
    }

    struct BlankGenerator;

    #[async_trait]
    impl AnswerGenerator for BlankGenerator {
        async fn generate(&self, _question: &str, _context: &str) -> Result<String> {
            Ok("  \n".to_string())
        }
    }

    #[derive(Default)]
    struct EchoGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnswerGenerator for EchoGenerator {
        async fn generate(&self, question: &str, context: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} | {}", question, context.lines().nth(1).unwrap_or("")))
        }
    }

    fn matches() -> Vec<Match> {
        vec![
            sample_match("vid", 2, "The heat shield is made of PICA.", 0.9),
            sample_match("vid", 0, "Reentry takes about seven minutes.", 0.7),
        ]
    }

    #[tokio::test]
    async fn test_extractive_concatenates_in_ranking_order() {
        let composer = ExtractiveComposer::new(" | ", 2000);
        let answer = composer.compose("what shield?", &matches()).await;
        assert_eq!(
            answer,
            "Based on the transcript:\n\nThe heat shield is made of PICA. | Reentry takes about seven minutes."
        );
    }

    #[tokio::test]
    async fn test_extractive_truncates() {
        let composer = ExtractiveComposer::new(" ", 10);
        let answer = composer.compose("q", &matches()).await;
        assert_eq!(answer, "Based on the transcript:\n\nThe heat s...");
    }

    #[tokio::test]
    async fn test_extractive_truncates_on_char_boundary() {
        let composer = ExtractiveComposer::new(" ", 3);
        let m = vec![sample_match("vid", 0, "ååååå", 1.0)];
        assert_eq!(
            composer.compose("q", &m).await,
            "Based on the transcript:\n\nååå..."
        );
    }

    #[tokio::test]
    async fn test_empty_matches_give_fixed_message() {
        let generator = Arc::new(EchoGenerator::default());
        let composers: Vec<Box<dyn AnswerComposer>> = vec![
            Box::new(ExtractiveComposer::default()),
            Box::new(GeneratingComposer::new(
                generator.clone(),
                ExtractiveComposer::default(),
            )),
        ];
        for composer in composers {
            assert_eq!(composer.compose("anything?", &[]).await, NO_INFORMATION_MESSAGE);
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_generator_falls_back_to_extractive() {
        let extractive = ExtractiveComposer::new("\n\n", 500);
        let expected = extractive.compose("why?", &matches()).await;

        let failing = GeneratingComposer::new(Arc::new(FailingGenerator), extractive.clone());
        assert_eq!(failing.compose("why?", &matches()).await, expected);

        let blank = GeneratingComposer::new(Arc::new(BlankGenerator), extractive);
        assert_eq!(blank.compose("why?", &matches()).await, expected);
    }

    #[tokio::test]
    async fn test_generator_receives_numbered_context() {
        let composer =
            GeneratingComposer::new(Arc::new(EchoGenerator::default()), ExtractiveComposer::default());
        let answer = composer.compose("why?", &matches()).await;
        assert_eq!(answer, "why? | [1] vid #2");
    }
}
