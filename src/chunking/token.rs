//! Word-window chunking.

use super::TextChunk;

/// Byte spans of whitespace-delimited tokens, in order.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        spans.push((s, text.len()));
    }

    spans
}

/// Produce word windows of `size` tokens starting every `stride` tokens.
pub(super) fn windows(text: &str, size: usize, stride: usize) -> Vec<TextChunk> {
    let spans = token_spans(text);
    let n = spans.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < n {
        let end = (start + size).min(n);
        let window = &spans[start..end];

        let rendered = window
            .iter()
            .map(|&(s, e)| &text[s..e])
            .collect::<Vec<_>>()
            .join(" ");

        chunks.push(TextChunk {
            text: rendered,
            char_start: window[0].0,
            char_end: window[window.len() - 1].1,
            window: start..end,
        });

        start += stride;
    }

    chunks
}
