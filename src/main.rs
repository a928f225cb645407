//! Vidsage CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidsage::cli::{commands, Cli, Commands};
use vidsage::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(Some(config_path.as_path()))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidsage={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Ingest {
            locator,
            text_file,
            source_id,
            upsert,
        } => {
            commands::run_ingest(
                locator,
                text_file.as_deref(),
                source_id.as_deref(),
                *upsert,
                settings,
            )
            .await?;
        }

        Commands::Search {
            query,
            top_k,
            min_score,
        } => {
            commands::run_search(query, *top_k, *min_score, settings).await?;
        }

        Commands::Ask {
            question,
            top_k,
            no_generate,
        } => {
            commands::run_ask(question, *top_k, *no_generate, settings).await?;
        }

        Commands::Chat { top_k, no_generate } => {
            commands::run_chat(*top_k, *no_generate, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Remove { source_id } => {
            commands::run_remove(source_id, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
