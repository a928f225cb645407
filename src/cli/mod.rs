//! CLI module for Vidsage.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vidsage - Ask questions about YouTube videos
///
/// Fetches video transcripts, indexes them in a local vector index and answers
/// questions from the indexed passages.
#[derive(Parser, Debug)]
#[command(name = "vidsage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDSAGE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a transcript and index it
    Ingest {
        /// YouTube URL/ID, or local transcript file path
        locator: String,

        /// Read the transcript from this text file instead of fetching it
        #[arg(long, requires = "source_id")]
        text_file: Option<String>,

        /// Source ID to index a --text-file under
        #[arg(long)]
        source_id: Option<String>,

        /// Replace any chunks already indexed for this source
        #[arg(long)]
        upsert: bool,
    },

    /// Search for relevant transcript passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Minimum similarity score
        #[arg(short, long)]
        min_score: Option<f32>,
    },

    /// Ask a question and get an answer from the indexed transcripts
    Ask {
        /// The question to ask
        question: String,

        /// Number of passages to answer from
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Answer with the top passages instead of calling a language model
        #[arg(long)]
        no_generate: bool,
    },

    /// Start an interactive question session
    Chat {
        /// Number of passages to answer from
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Answer with the top passages instead of calling a language model
        #[arg(long)]
        no_generate: bool,
    },

    /// List indexed sources
    List,

    /// Remove every indexed chunk of a source
    Remove {
        /// Source ID to remove
        source_id: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
