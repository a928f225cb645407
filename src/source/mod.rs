//! Transcript sources for Vidsage.
//!
//! Provides a trait-based interface for the places a transcript can come from
//! (YouTube captions, local files) and a chain that tries them in order.

mod captions;
mod local;
mod video_id;
mod youtube;

pub use captions::caption_to_text;
pub use local::LocalFileSource;
pub use video_id::VideoIdExtractor;
pub use youtube::YoutubeCaptionSource;

use crate::config::SourceSettings;
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

/// A transcript obtained from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedTranscript {
    /// Identifier the transcript is indexed under.
    pub source_id: String,
    /// Plain transcript text.
    pub text: String,
    /// Human-readable title, when the source knows one.
    pub title: Option<String>,
}

/// Trait for transcript source providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Check if this source can handle the given locator (URL, id, path).
    fn can_handle(&self, locator: &str) -> bool;

    /// Fetch the transcript for a locator.
    async fn fetch(&self, locator: &str) -> Result<FetchedTranscript>;
}

/// Ordered list of sources; the first one that succeeds wins.
pub struct SourceChain {
    sources: Vec<Box<dyn TranscriptSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn TranscriptSource>>) -> Self {
        Self { sources }
    }

    /// Build the chain named by `settings.order`.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self> {
        let mut sources: Vec<Box<dyn TranscriptSource>> = Vec::new();
        for name in &settings.order {
            match name.to_lowercase().as_str() {
                "youtube" => sources.push(Box::new(YoutubeCaptionSource::new(
                    settings.languages.clone(),
                )?)),
                "local" => sources.push(Box::new(LocalFileSource::new())),
                other => {
                    return Err(VidsageError::Config(format!(
                        "Unknown transcript source: {}. Use youtube or local.",
                        other
                    )))
                }
            }
        }
        Ok(Self::new(sources))
    }

    /// Names of the sources that would be tried for `locator`.
    pub fn candidates(&self, locator: &str) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| s.can_handle(locator))
            .map(|s| s.name())
            .collect()
    }

    /// Fetch from the first source that can handle `locator` and succeeds.
    pub async fn fetch(&self, locator: &str) -> Result<FetchedTranscript> {
        let mut failures = Vec::new();
        let mut tried = false;

        for source in self.sources.iter().filter(|s| s.can_handle(locator)) {
            tried = true;
            match source.fetch(locator).await {
                Ok(transcript) => {
                    info!(
                        "Fetched {} from {} ({} characters)",
                        transcript.source_id,
                        source.name(),
                        transcript.text.len()
                    );
                    return Ok(transcript);
                }
                Err(e) => {
                    warn!("Source {} failed for {}: {}", source.name(), locator, e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if !tried {
            return Err(VidsageError::InvalidInput(format!(
                "No transcript source can handle {}",
                locator
            )));
        }

        Err(VidsageError::SourceUnavailable(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        prefix: &'static str,
        result: std::result::Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl TranscriptSource for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn can_handle(&self, locator: &str) -> bool {
            locator.starts_with(self.prefix)
        }

        async fn fetch(&self, locator: &str) -> Result<FetchedTranscript> {
            match self.result {
                Ok(text) => Ok(FetchedTranscript {
                    source_id: locator.to_string(),
                    text: text.to_string(),
                    title: None,
                }),
                Err(reason) => Err(VidsageError::NoContent(reason.to_string())),
            }
        }
    }

    fn fixed(
        name: &'static str,
        prefix: &'static str,
        result: std::result::Result<&'static str, &'static str>,
    ) -> Box<dyn TranscriptSource> {
        Box::new(Fixed {
            name,
            prefix,
            result,
        })
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = SourceChain::new(vec![
            fixed("broken", "vid", Err("no captions")),
            fixed("skipped", "file", Ok("never")),
            fixed("backup", "vid", Ok("from backup")),
        ]);

        assert_eq!(chain.candidates("vid1"), vec!["broken", "backup"]);
        let fetched = chain.fetch("vid1").await.unwrap();
        assert_eq!(fetched.text, "from backup");
    }

    #[tokio::test]
    async fn test_all_failures_are_listed() {
        let chain = SourceChain::new(vec![
            fixed("first", "vid", Err("no captions")),
            fixed("second", "vid", Err("rate limited")),
        ]);

        let err = chain.fetch("vid1").await.unwrap_err();
        let VidsageError::SourceUnavailable(message) = err else {
            panic!("expected SourceUnavailable");
        };
        assert!(message.contains("first: No transcript content: no captions"));
        assert!(message.contains("second: No transcript content: rate limited"));
    }

    #[tokio::test]
    async fn test_unhandled_locator() {
        let chain = SourceChain::new(vec![fixed("only", "vid", Ok("x"))]);
        assert!(matches!(
            chain.fetch("ftp://elsewhere").await,
            Err(VidsageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = SourceSettings::default();
        let chain = SourceChain::from_settings(&settings).unwrap();
        assert_eq!(chain.candidates("dQw4w9WgXcQ"), vec!["youtube"]);

        let bad = SourceSettings {
            order: vec!["carrier-pigeon".to_string()],
            ..SourceSettings::default()
        };
        assert!(SourceChain::from_settings(&bad).is_err());
    }
}
