//! Configuration module for Vidsage.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    AnswerSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IndexSettings,
    IngestSettings, PromptSettings, RetrievalSettings, Settings, SourceSettings,
};
