//! Vidsage - Question answering over YouTube transcripts
//!
//! A local-first CLI tool and library that fetches video transcripts, indexes them
//! in a vector index and answers questions from the most relevant passages.
//!
//! # Overview
//!
//! Vidsage allows you to:
//! - Fetch transcripts from YouTube captions or local transcript files
//! - Split them into overlapping chunks and embed them in batches
//! - Search the indexed passages semantically
//! - Ask questions and get answers with cited passages
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `source` - Transcript sources (YouTube captions, local files)
//! - `chunking` - Chunking policies
//! - `embedding` - Embedding providers
//! - `vector_store` - Vector index abstraction
//! - `pipeline` - Ingestion and retrieval
//! - `rag` - Answer composition
//! - `orchestrator` - Wiring from settings to actions
//!
//! # Example
//!
//! ```rust,no_run
//! use vidsage::config::Settings;
//! use vidsage::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.ingest_locator("dQw4w9WgXcQ", None).await?;
//!     println!("Indexed {} chunks", result.chunk_count);
//!
//!     let response = orchestrator.ask("What is the song about?", None, true).await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;
pub mod rag;
pub mod source;
pub mod vector_store;

pub use error::{Result, VidsageError};
