//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::pipeline::IngestMode;
use anyhow::{Context, Result};

/// Run the ingest command.
pub async fn run_ingest(
    locator: &str,
    text_file: Option<&str>,
    source_id: Option<&str>,
    upsert: bool,
    settings: Settings,
) -> Result<()> {
    let fetch_locator = if text_file.is_some() { None } else { Some(locator) };
    if let Err(e) = preflight::check(Operation::Ingest { locator: fetch_locator }, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mode = upsert.then_some(IngestMode::Upsert);

    let spinner = Output::spinner("Fetching transcript and indexing...");
    let result = match (text_file, source_id) {
        (Some(path), Some(id)) => {
            let path = Settings::expand_path(path);
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            orchestrator.ingest_text(id, &text, mode).await
        }
        _ => orchestrator.ingest_locator(locator, mode).await,
    };
    spinner.finish_and_clear();

    match result {
        Ok(result) => {
            Output::success(&format!(
                "Indexed {} chunks for {}",
                result.chunk_count, result.source_id
            ));
            if let Some(title) = &result.title {
                Output::kv("Title", title);
            }
            Output::kv("Mode", &format!("{:?}", result.mode).to_lowercase());
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
