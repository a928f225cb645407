//! Local transcript file source.
//!
//! Reads `.srt`/`.vtt` caption files or plain text.

use super::captions::{caption_to_text, is_caption_extension};
use super::{FetchedTranscript, TranscriptSource};
use crate::error::{Result, VidsageError};
use async_trait::async_trait;
use std::path::Path;

/// Local file source for transcripts.
pub struct LocalFileSource;

impl LocalFileSource {
    pub fn new() -> Self {
        Self
    }

    /// Source id for a file: `local_` followed by the file stem.
    pub fn source_id_for(path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");
        format!("local_{}", stem.replace([' ', '/', '\\'], "_"))
    }
}

impl Default for LocalFileSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for LocalFileSource {
    fn name(&self) -> &str {
        "local"
    }

    fn can_handle(&self, locator: &str) -> bool {
        Path::new(&*shellexpand::tilde(locator)).is_file()
    }

    async fn fetch(&self, locator: &str) -> Result<FetchedTranscript> {
        let expanded = shellexpand::tilde(locator).to_string();
        let path = Path::new(&expanded);

        if !path.is_file() {
            return Err(VidsageError::InvalidInput(format!(
                "File not found: {}",
                locator
            )));
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let is_caption = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_caption_extension);

        let text = if is_caption {
            caption_to_text(&raw)
        } else {
            raw.trim().to_string()
        };

        if text.is_empty() {
            return Err(VidsageError::NoContent(format!("{} is empty", locator)));
        }

        Ok(FetchedTranscript {
            source_id: Self::source_id_for(path),
            text,
            title: path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string()),
        })
    }
}
