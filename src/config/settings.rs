//! Configuration settings for Vidsage.

use crate::chunking::{ChunkingConfig, ChunkingPolicy, DEFAULT_MIN_CHARS};
use crate::error::{Result, VidsageError};
use crate::pipeline::IngestMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub ingest: IngestSettings,
    pub retrieval: RetrievalSettings,
    pub answer: AnswerSettings,
    pub sources: SourceSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vidsage".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Transcript chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Windowing policy (token_window, char_window).
    pub policy: ChunkingPolicy,
    /// Window size, in tokens or characters depending on the policy.
    pub size: usize,
    /// Units shared by consecutive windows.
    pub overlap: usize,
    /// Chunks shorter than this many characters are discarded (0 keeps everything).
    pub min_chars: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            policy: ChunkingPolicy::TokenWindow,
            size: 200,
            overlap: 40,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, hash).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Texts per embedding request.
    pub batch_size: usize,
    /// Embedding requests in flight at once during ingestion.
    pub max_concurrent: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 100,
            max_concurrent: 4,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Similarity metric (cosine, inner_product).
    pub metric: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.vidsage/index.db".to_string(),
            metric: "cosine".to_string(),
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// What re-ingesting a source does (append, upsert).
    pub mode: IngestMode,
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of matches returned when the caller doesn't say.
    pub top_k: usize,
    /// Matches scoring below this are dropped.
    pub min_score: Option<f32>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: None,
        }
    }
}

/// Answer composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// Call a language model to write answers; otherwise answers are extractive.
    pub generate: bool,
    /// LLM model for answer generation.
    pub model: String,
    /// Longest extractive answer body, in characters.
    pub max_context_chars: usize,
    /// Text placed between passages in extractive answers.
    pub separator: String,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            generate: true,
            model: "gpt-4o-mini".to_string(),
            max_context_chars: 2000,
            separator: "\n\n".to_string(),
        }
    }
}

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Caption languages to try first, in order.
    pub languages: Vec<String>,
    /// Sources tried for a locator, in order (youtube, local).
    pub order: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            languages: ["en", "a.en", "en-US", "en-GB"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            order: vec!["youtube".to_string(), "local".to_string()],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidsageError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidsage")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.index.sqlite_path)
    }

    /// Validated chunking configuration from the `[chunking]` section.
    pub fn chunking_config(&self) -> Result<ChunkingConfig> {
        let config = ChunkingConfig::new(self.chunking.size, self.chunking.overlap)?
            .with_policy(self.chunking.policy)
            .with_min_chars(self.chunking.min_chars);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.size, 200);
        assert_eq!(settings.chunking.overlap, 40);
        assert_eq!(settings.chunking.min_chars, 20);
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.ingest.mode, IngestMode::Append);
        assert_eq!(settings.sources.languages[0], "en");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            policy = "char_window"
            size = 500

            [ingest]
            mode = "upsert"
            "#,
        )
        .unwrap();

        assert_eq!(settings.chunking.policy, ChunkingPolicy::CharWindow);
        assert_eq!(settings.chunking.size, 500);
        assert_eq!(settings.chunking.overlap, 40);
        assert_eq!(settings.ingest.mode, IngestMode::Upsert);
        assert_eq!(settings.index.provider, "sqlite");
    }

    #[test]
    fn test_chunking_config_validation() {
        let mut settings = Settings::default();
        let config = settings.chunking_config().unwrap();
        assert_eq!(config.stride(), 160);

        settings.chunking.overlap = 200;
        assert!(matches!(
            settings.chunking_config(),
            Err(VidsageError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.embedding.provider = "hash".to_string();
        settings.retrieval.min_score = Some(0.25);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.embedding.provider, "hash");
        assert_eq!(loaded.retrieval.min_score, Some(0.25));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded.answer.model, "gpt-4o-mini");
    }
}
