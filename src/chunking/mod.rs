//! Content chunking for breaking transcripts into overlapping, searchable windows.
//!
//! Two policies share one stride rule: windows start at unit index
//! `0, size - overlap, 2 * (size - overlap), ...` and stop once the start index
//! reaches the end of the text. The final window shrinks to the remaining units.
//!
//! - [`ChunkingPolicy::TokenWindow`] (default) counts whitespace-separated words, so a
//!   chunk never cuts a word in half. Chunk text is the window's words joined by
//!   single spaces.
//! - [`ChunkingPolicy::CharWindow`] counts characters and keeps the raw slice (trimmed).
//!
//! Windows whose rendered text is shorter than `min_chars` characters are dropped.

mod char_window;
mod token;

use crate::error::{Result, VidsageError};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Default minimum rendered length (in characters) for a chunk to be kept.
pub const DEFAULT_MIN_CHARS: usize = 20;

/// A window of text cut from a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Rendered chunk text.
    pub text: String,
    /// Byte offset of the first character covered by this chunk.
    pub char_start: usize,
    /// Byte offset one past the last character covered by this chunk.
    pub char_end: usize,
    /// Range of units (tokens or characters) covered by this window.
    pub window: Range<usize>,
}

/// How text is divided into units before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingPolicy {
    /// Whitespace-delimited word windows.
    #[default]
    TokenWindow,
    /// Character windows.
    CharWindow,
}

impl std::str::FromStr for ChunkingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "token_window" | "token" | "tokens" | "word" => Ok(ChunkingPolicy::TokenWindow),
            "char_window" | "char" | "chars" | "character" => Ok(ChunkingPolicy::CharWindow),
            _ => Err(format!("Unknown chunking policy: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingPolicy::TokenWindow => write!(f, "token_window"),
            ChunkingPolicy::CharWindow => write!(f, "char_window"),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Unit policy.
    pub policy: ChunkingPolicy,
    /// Window size in units.
    pub size: usize,
    /// Units shared by consecutive windows.
    pub overlap: usize,
    /// Minimum rendered length in characters; 0 disables the filter.
    pub min_chars: usize,
}

impl ChunkingConfig {
    /// Create a validated token-window configuration with the default length filter.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            policy: ChunkingPolicy::TokenWindow,
            size,
            overlap,
            min_chars: DEFAULT_MIN_CHARS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the unit policy.
    pub fn with_policy(mut self, policy: ChunkingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the minimum chunk length (0 disables the filter).
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Check `size > overlap >= 0`.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(VidsageError::InvalidConfiguration(
                "chunk size must be positive".to_string(),
            ));
        }
        if self.overlap >= self.size {
            return Err(VidsageError::InvalidConfiguration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.size
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            policy: ChunkingPolicy::TokenWindow,
            size: 200,
            overlap: 40,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// Split text into overlapping chunks according to `config`.
///
/// Empty or whitespace-only text yields an empty sequence. The output depends only
/// on `(text, config)`.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
    config.validate()?;

    let windows = match config.policy {
        ChunkingPolicy::TokenWindow => token::windows(text, config.size, config.stride()),
        ChunkingPolicy::CharWindow => char_window::windows(text, config.size, config.stride()),
    };

    Ok(windows
        .into_iter()
        .filter(|c| c.text.chars().count() >= config.min_chars)
        .collect())
}

/// Split text into overlapping word windows and return the chunk texts.
///
/// Uses the token-window policy and the default minimum length.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    let config = ChunkingConfig::new(size, overlap)?;
    Ok(chunk_text(text, &config)?
        .into_iter()
        .map(|c| c.text)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unfiltered(size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(size, overlap).unwrap().with_min_chars(0)
    }

    #[test]
    fn test_scenario_without_length_filter() {
        let chunks = chunk_text("a b c d e f g h", &unfiltered(4, 1)).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a b c d", "d e f g", "g h"]);
        assert_eq!(chunks[2].window, 6..8);
    }

    #[test]
    fn test_scenario_with_default_length_filter() {
        // Every window renders shorter than 20 characters.
        assert!(chunk("a b c d e f g h", 4, 1).unwrap().is_empty());

        let text = "alpha bravo charlie delta echo foxtrot golf hotel";
        let chunks = chunk(text, 4, 1).unwrap();
        assert_eq!(
            chunks,
            vec![
                "alpha bravo charlie delta".to_string(),
                "delta echo foxtrot golf".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk("", 10, 2).unwrap().is_empty());
        assert!(chunk("   \n\t  ", 10, 2).unwrap().is_empty());

        let config = unfiltered(10, 2).with_policy(ChunkingPolicy::CharWindow);
        assert!(chunk_text("    ", &config).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_configuration() {
        let text = "some words to split";
        assert!(matches!(
            chunk(text, 10, 10),
            Err(VidsageError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            chunk(text, 10, 20),
            Err(VidsageError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            chunk(text, 0, 0),
            Err(VidsageError::InvalidConfiguration(_))
        ));
        // Validation happens even for empty input.
        assert!(chunk("", 5, 5).is_err());
    }

    #[test]
    fn test_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(30);
        let first = chunk(&text, 12, 3).unwrap();
        let second = chunk(&text, 12, 3).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_coverage_and_overlap() {
        let words: Vec<String> = (0..97).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");

        for (size, overlap) in [(1, 0), (5, 0), (5, 2), (10, 9), (7, 3), (100, 50)] {
            let chunks = chunk_text(&text, &unfiltered(size, overlap)).unwrap();
            let mut covered = vec![false; words.len()];
            for c in &chunks {
                for i in c.window.clone() {
                    covered[i] = true;
                }
            }
            assert!(covered.iter().all(|&c| c), "size={} overlap={}", size, overlap);

            for pair in chunks.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                let shared = prev.window.end.saturating_sub(next.window.start);
                if prev.window.len() == size {
                    assert_eq!(shared, overlap, "size={} overlap={}", size, overlap);
                }
                assert_eq!(next.window.start - prev.window.start, size - overlap);
            }
        }
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = "  first   second\tthird\nfourth fifth  ";
        let chunks = chunk_text(text, &unfiltered(2, 0)).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(&text[chunks[0].char_start..chunks[0].char_end], "first   second");
        assert_eq!(chunks[0].text, "first second");
        assert_eq!(&text[chunks[2].char_start..chunks[2].char_end], "fifth");
        for c in &chunks {
            assert!(c.char_end > c.char_start);
        }
    }

    #[test]
    fn test_never_cuts_words() {
        let text = "internationalization localization globalization";
        let chunks = chunk_text(text, &unfiltered(2, 1)).unwrap();
        for c in &chunks {
            for word in c.text.split(' ') {
                assert!(text.split_whitespace().any(|w| w == word));
            }
        }
    }

    #[test]
    fn test_char_window_policy() {
        let config = unfiltered(4, 1).with_policy(ChunkingPolicy::CharWindow);
        let chunks = chunk_text("abcdefghij", &config).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "defg", "ghij", "j"]);

        let filtered = config.with_min_chars(2);
        let chunks = chunk_text("abcdefghij", &filtered).unwrap();
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_char_window_multibyte() {
        let config = unfiltered(3, 0).with_policy(ChunkingPolicy::CharWindow);
        let text = "héllo wörld";
        let chunks = chunk_text(text, &config).unwrap();
        for c in &chunks {
            assert_eq!(&text[c.char_start..c.char_end], c.text);
        }
        assert_eq!(chunks[0].text, "hél");
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            "token_window".parse::<ChunkingPolicy>().unwrap(),
            ChunkingPolicy::TokenWindow
        );
        assert_eq!(
            "char-window".parse::<ChunkingPolicy>().unwrap(),
            ChunkingPolicy::CharWindow
        );
        assert!("sentences".parse::<ChunkingPolicy>().is_err());
        assert_eq!(ChunkingPolicy::CharWindow.to_string(), "char_window");
    }
}
