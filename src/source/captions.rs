//! Caption file (SRT / WebVTT) to plain text.

/// Convert SRT or WebVTT caption text into a single line of transcript text.
///
/// Cue numbers, timing lines, headers, notes and inline markup are dropped; a line
/// repeating the previous kept line is skipped (auto-captions roll lines forward).
pub fn caption_to_text(raw: &str) -> String {
    let mut kept: Vec<String> = Vec::new();
    let mut in_header = false;

    for line in raw.lines() {
        let line = line.trim();

        if line.starts_with("WEBVTT") {
            in_header = true;
            continue;
        }
        if in_header {
            // The header block runs until the first blank line.
            if line.is_empty() {
                in_header = false;
            }
            continue;
        }

        if line.is_empty()
            || line.contains("-->")
            || line.chars().all(|c| c.is_ascii_digit())
            || line.starts_with("NOTE")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
        {
            continue;
        }

        let text = strip_tags(line);
        let text = text.trim();
        if text.is_empty() || kept.last().is_some_and(|last| last == text) {
            continue;
        }
        kept.push(text.to_string());
    }

    kept.join(" ").trim().to_string()
}

/// Remove `<...>` markup such as `<c>`, `<i>` or inline `<00:00:01.000>` timestamps.
///
/// A `<` followed by whitespace, or with no closing `>` on the line, is literal text.
fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let is_tag = !after.starts_with(char::is_whitespace);
        match after.find('>') {
            Some(close) if is_tag => {
                out.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Whether a file extension names a caption format.
pub fn is_caption_extension(ext: &str) -> bool {
    matches!(ext.to_lowercase().as_str(), "srt" | "vtt")
}
