// src/truncate.rs
//! Sentence-aware length bound for descriptions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default description bound, in characters.
pub const DEFAULT_MAX_LEN: usize = 400;

static RE_SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s+").expect("sentence boundary regex"));

/// Split after every "period followed by whitespace". The period stays with its
/// sentence, the whitespace is consumed.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in RE_SENTENCE_END.find_iter(text) {
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    out.push(&text[start..]);
    out
}

/// Bound `text` to at most `max` characters, cutting only at sentence boundaries.
///
/// Text already within the bound is returned unchanged. Whole sentences are
/// accumulated greedily; when even the first sentence does not fit, the result
/// is empty. There is deliberately no hard character cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut result = String::new();
    let mut len = 0usize;
    for sentence in sentences(text) {
        let n = sentence.chars().count();
        if len + n > max {
            break;
        }
        result.push_str(sentence);
        result.push(' ');
        len += n + 1;
    }
    result.trim().to_string()
}

/// [`truncate`] with [`DEFAULT_MAX_LEN`].
pub fn truncate_default(text: &str) -> String {
    truncate(text, DEFAULT_MAX_LEN)
}
