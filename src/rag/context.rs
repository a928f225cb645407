//! Formatting retrieved matches for prompts and for display.

use crate::pipeline::Match;
use crate::source::VideoIdExtractor;

/// Link to the video a source id refers to.
///
/// Only ids that are YouTube video ids get one; local files and ids chosen by
/// the caller have none.
pub fn source_url(source_id: &str) -> Option<String> {
    if source_id.starts_with("local_") {
        return None;
    }
    let video_id = VideoIdExtractor::new().ok()?.extract(source_id)?;
    Some(format!("https://youtube.com/watch?v={}", video_id))
}

/// Format matches as numbered passages for a generation prompt.
pub fn format_context_for_prompt(matches: &[Match]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "---\n[{}] {} #{}\n{}\n---",
                i + 1,
                m.chunk.source_id,
                m.chunk.sequence_index,
                m.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format matches for display to the user.
pub fn format_context_for_display(matches: &[Match]) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let url_part = source_url(&m.chunk.source_id)
                .map(|u| format!("\n    Link: {}", u))
                .unwrap_or_default();

            format!(
                "[{}] {} #{} (score: {:.2}){}",
                i + 1,
                m.chunk.source_id,
                m.chunk.sequence_index,
                m.score,
                url_part
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::Chunk;

    pub(crate) fn sample_match(source_id: &str, seq: usize, text: &str, score: f32) -> Match {
        Match {
            chunk: Chunk {
                chunk_id: format!("{}-{}", source_id, seq),
                source_id: source_id.to_string(),
                sequence_index: seq,
                text: text.to_string(),
                char_start: 0,
                char_end: text.len(),
            },
            score,
        }
    }

    #[test]
    fn test_source_url() {
        assert_eq!(
            source_url("dQw4w9WgXcQ").as_deref(),
            Some("https://youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(source_url("local_lecture"), None);
        assert_eq!(source_url("my-notes"), None);
        assert_eq!(source_url("notes from the keynote"), None);
    }

    #[test]
    fn test_prompt_context_is_numbered_in_order() {
        let matches = vec![
            sample_match("abc", 4, "first passage", 0.9),
            sample_match("local_notes", 0, "second passage", 0.5),
        ];
        let context = format_context_for_prompt(&matches);
        assert_eq!(
            context,
            "---\n[1] abc #4\nfirst passage\n---\n\n---\n[2] local_notes #0\nsecond passage\n---"
        );
    }

    #[test]
    fn test_display_includes_links_for_videos_only() {
        let matches = vec![
            sample_match("dQw4w9WgXcQ", 1, "x", 0.875),
            sample_match("local_notes", 0, "y", 0.5),
        ];
        let display = format_context_for_display(&matches);
        assert!(display.contains("[1] dQw4w9WgXcQ #1 (score: 0.88)"));
        assert!(display.contains("Link: https://youtube.com/watch?v=dQw4w9WgXcQ"));
        assert_eq!(display.matches("Link:").count(), 1);
    }
}
