//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, VidsageError};
use crate::openai::is_api_key_configured;
use crate::source::VideoIdExtractor;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingesting embeds chunks and may fetch captions with yt-dlp.
    Ingest { locator: Option<&'a str> },
    /// Asking embeds the question and may generate an answer.
    Ask { generate: bool },
    /// Searching embeds the query.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    let embeds_remotely = settings.embedding.provider.eq_ignore_ascii_case("openai");

    match operation {
        Operation::Ingest { locator } => {
            if embeds_remotely {
                check_api_key()?;
            }
            if let Some(locator) = locator {
                if is_youtube_locator(locator)? {
                    check_tool("yt-dlp")?;
                }
            }
        }
        Operation::Ask { generate } => {
            if embeds_remotely || (generate && settings.answer.generate) {
                check_api_key()?;
            }
        }
        Operation::Search => {
            if embeds_remotely {
                check_api_key()?;
            }
        }
    }
    Ok(())
}

fn is_youtube_locator(locator: &str) -> Result<bool> {
    if std::path::Path::new(locator).is_file() {
        return Ok(false);
    }
    Ok(VideoIdExtractor::new()?.extract(locator).is_some())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        return Ok(());
    }
    Err(VidsageError::Config(
        "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' \
         or use embedding.provider = \"hash\""
            .to_string(),
    ))
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidsageError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsageError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidsageError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
