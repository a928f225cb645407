//! YouTube video id extraction.

use crate::error::{Result, VidsageError};
use regex::Regex;
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

/// Extracts the 11-character video id from YouTube URLs or bare ids.
pub struct VideoIdExtractor {
    id_pattern: Regex,
}

impl VideoIdExtractor {
    pub fn new() -> Result<Self> {
        let id_pattern = Regex::new(r"^[0-9A-Za-z_-]{11}$")
            .map_err(|e| VidsageError::Config(format!("Invalid video id pattern: {}", e)))?;
        Ok(Self { id_pattern })
    }

    fn is_id(&self, candidate: &str) -> bool {
        self.id_pattern.is_match(candidate)
    }

    /// Video id for a watch, `youtu.be`, embed, shorts or `v/` URL, or a bare id.
    pub fn extract(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if self.is_id(input) {
            return Some(input.to_string());
        }

        let url = if input.contains("://") {
            Url::parse(input).ok()?
        } else {
            Url::parse(&format!("https://{}", input)).ok()?
        };
        let host = url.host_str()?.to_lowercase();
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

        let candidate: Option<String> = if host == "youtu.be" || host == "www.youtu.be" {
            segments.next().map(str::to_string)
        } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed" | "shorts" | "v" | "live") => segments.next().map(str::to_string),
                _ => None,
            }
        } else {
            None
        };

        let candidate = candidate?;
        self.is_id(&candidate).then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let extractor = VideoIdExtractor::new().unwrap();
        let expected = Some("dQw4w9WgXcQ".to_string());

        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/v/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ] {
            assert_eq!(extractor.extract(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_rejects_non_video_inputs() {
        let extractor = VideoIdExtractor::new().unwrap();
        for input in [
            "",
            "not-a-video-id",
            "https://vimeo.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/playlist?list=PL123",
            "/home/me/notes.txt",
        ] {
            assert_eq!(extractor.extract(input), None, "{}", input);
        }
    }
}
