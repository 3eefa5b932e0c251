//! Plain-text helpers for the summarization pipeline. All of them are
//! single-pass and allocation-light; none of them can fail.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]\s+").unwrap();
    static ref REFERENCES_HEADING: Regex = Regex::new(r"\b(?:References|REFERENCES)\b").unwrap();
}

/// Collapses every whitespace run to one space and trims both ends.
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Drops everything from the first "References" or "REFERENCES" word to
/// the end. Lower-case prose mentions are left alone.
pub fn strip_references(text: &str) -> &str {
    match REFERENCES_HEADING.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Splits after `.`, `!` or `?` when followed by whitespace. The
/// punctuation stays with its sentence; the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK.find_iter(text) {
        // punctuation is a single ASCII byte
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    out.push(&text[start..]);
    out
}

/// Fixed-size, non-overlapping windows of `size` characters.
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    assert!(size > 0, "chunk size must be positive");
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Sentence-level dedup: case-insensitive, first occurrence wins, order kept.
pub fn remove_duplicate_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for sentence in split_sentences(text) {
        let s = sentence.trim();
        if !s.is_empty() && seen.insert(s.to_lowercase()) {
            unique.push(s);
        }
    }
    unique.join(" ")
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Length-ranked salient sentences.
///
/// Candidates have strictly between 8 and 30 words; ties keep document order.
pub fn extract_key_points(text: &str, num_points: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<&str> = split_sentences(text)
        .into_iter()
        .filter(|s| {
            let n = word_count(s);
            n > 8 && n < 30
        })
        .map(str::trim)
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect();

    candidates.sort_by(|a, b| word_count(b).cmp(&word_count(a)));
    candidates
        .into_iter()
        .take(num_points)
        .map(|kp| split_sentences(kp).into_iter().take(2).collect::<Vec<_>>().join(" "))
        .collect()
}
