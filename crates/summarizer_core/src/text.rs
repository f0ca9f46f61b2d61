//! crates/summarizer_core/src/text.rs
//!
//! Pure text rules shared by the client-visible extraction path and the
//! summarization path. Keeping them here guarantees both paths apply the
//! identical cap, marker, and tokenization rules.

/// Maximum number of characters of extracted text kept for summarization.
pub const MAX_EXTRACT_CHARS: usize = 100_000;

/// Appended to extracted text that exceeded [`MAX_EXTRACT_CHARS`].
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Maximum number of characters of the source text copied into a history
/// record. The rest is irreversibly discarded.
pub const HISTORY_EXCERPT_CHARS: usize = 1_000;

/// Counts whitespace-delimited tokens, discarding empty ones.
///
/// This is the single tokenization rule used everywhere word counts are
/// produced (extraction, summarization, history).
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Caps extracted text at [`MAX_EXTRACT_CHARS`] characters, appending
/// [`TRUNCATION_MARKER`] when anything was cut. Text at or under the cap
/// passes through verbatim.
pub fn cap_extracted_text(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(MAX_EXTRACT_CHARS) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut capped = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            capped.push_str(&text[..byte_idx]);
            capped.push_str(TRUNCATION_MARKER);
            capped
        }
    }
}

/// Returns the first [`HISTORY_EXCERPT_CHARS`] characters of the source
/// text for storage in a history record.
pub fn history_excerpt(text: &str) -> String {
    text.chars().take(HISTORY_EXCERPT_CHARS).collect()
}

/// Integer percentage reduction in word count from original to summary,
/// `round((1 - summary/original) * 100)`. Negative when the summary is
/// longer than the input. Zero-word originals yield 0 rather than dividing
/// by zero.
pub fn compression_ratio(original_words: usize, summary_words: usize) -> i32 {
    if original_words == 0 {
        return 0;
    }
    ((1.0 - summary_words as f64 / original_words as f64) * 100.0).round() as i32
}

/// Case-insensitive substring match over a record's file name and summary
/// text. An empty or whitespace-only query matches everything.
pub fn matches_history_query(file_name: &str, summary: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    file_name.to_lowercase().contains(&needle) || summary.to_lowercase().contains(&needle)
}
