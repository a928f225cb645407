//! Error types for Vidsage.

use thiserror::Error;

/// Library-level error type for Vidsage operations.
#[derive(Error, Debug)]
pub enum VidsageError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Nothing to index: {0}")]
    EmptyContent(String),

    #[error("Query is empty. Ask a question with at least one word.")]
    EmptyQuery,

    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Failed to write to the vector index: {0}")]
    IndexWrite(String),

    #[error("Failed to query the vector index: {0}")]
    IndexQuery(String),

    #[error("Transcript source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No transcript content: {0}")]
    NoContent(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl VidsageError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VidsageError::InvalidConfiguration(_) => "invalid_configuration",
            VidsageError::EmptyContent(_) => "empty_content",
            VidsageError::EmptyQuery => "empty_query",
            VidsageError::DimensionMismatch { .. } => "dimension_mismatch",
            VidsageError::EmbeddingUnavailable(_) => "embedding_unavailable",
            VidsageError::IndexWrite(_) => "index_write_error",
            VidsageError::IndexQuery(_) => "index_query_error",
            VidsageError::SourceUnavailable(_) => "source_unavailable",
            VidsageError::NoContent(_) => "no_content",
            VidsageError::Generation(_) => "generation_failed",
            VidsageError::Config(_) => "config",
            VidsageError::InvalidInput(_) => "invalid_input",
            VidsageError::ToolNotFound(_) => "tool_not_found",
            VidsageError::Io(_) => "io",
            VidsageError::Json(_) => "json",
            VidsageError::TomlParse(_) => "toml_parse",
            VidsageError::Http(_) => "http",
            VidsageError::Database(_) => "database",
        }
    }

    /// Whether the error was caused by the caller rather than a collaborator.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            VidsageError::InvalidConfiguration(_)
                | VidsageError::EmptyContent(_)
                | VidsageError::EmptyQuery
                | VidsageError::DimensionMismatch { .. }
                | VidsageError::InvalidInput(_)
                | VidsageError::NoContent(_)
        )
    }
}

/// Result type alias for Vidsage operations.
pub type Result<T> = std::result::Result<T, VidsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_distinct_message() {
        let errors = vec![
            VidsageError::InvalidConfiguration("overlap must be smaller than size".to_string()),
            VidsageError::EmptyContent("abc".to_string()),
            VidsageError::EmptyQuery,
            VidsageError::DimensionMismatch { expected: 3, actual: 4 },
            VidsageError::EmbeddingUnavailable("timeout".to_string()),
            VidsageError::IndexWrite("disk full".to_string()),
            VidsageError::IndexQuery("locked".to_string()),
            VidsageError::SourceUnavailable("youtube: 404".to_string()),
            VidsageError::NoContent("no captions".to_string()),
        ];

        let messages: std::collections::HashSet<String> =
            errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), errors.len());

        let kinds: std::collections::HashSet<&str> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = VidsageError::DimensionMismatch { expected: 1536, actual: 768 };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: index expects 1536, got 768"
        );
        assert!(err.is_caller_error());
        assert!(!VidsageError::IndexWrite("x".to_string()).is_caller_error());
    }
}
