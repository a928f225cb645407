//! Remove command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the remove command.
pub async fn run_remove(source_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let removed = orchestrator.remove_source(source_id).await?;
    if removed == 0 {
        Output::warning(&format!("No chunks indexed for {}", source_id));
    } else {
        Output::success(&format!("Removed {} chunks of {}", removed, source_id));
    }

    Ok(())
}
