//! Character-window chunking.

use super::TextChunk;

/// Produce character windows of `size` chars starting every `stride` chars.
///
/// Each window is trimmed; offsets describe the trimmed slice. Windows that are
/// blank after trimming are skipped.
pub(super) fn windows(text: &str, size: usize, stride: usize) -> Vec<TextChunk> {
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = boundaries.len();
    let byte_at = |idx: usize| boundaries.get(idx).copied().unwrap_or(text.len());

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < n {
        let end = (start + size).min(n);
        let (b_start, b_end) = (byte_at(start), byte_at(end));
        let slice = &text[b_start..b_end];
        let trimmed = slice.trim();

        if !trimmed.is_empty() {
            let leading = slice.len() - slice.trim_start().len();
            let char_start = b_start + leading;
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                char_start,
                char_end: char_start + trimmed.len(),
                window: start..end,
            });
        }

        start += stride;
    }

    chunks
}
