// src/sanitize.rs
//! Text sanitizer: turns raw, possibly malformed feed markup into plain display text.
//!
//! Output is restricted to printable 7-bit ASCII. Non-ASCII characters are dropped,
//! not transliterated, so non-English titles disappear entirely.

use once_cell::sync::Lazy;
use regex::Regex;

// The regex crate has no back-references, so each element gets its own alternative.
static RE_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<link\b[^>]*>.*?</link\s*>",
    )
    .expect("block element regex")
});

static RE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:br|p|div)\b[^>]*>").expect("line break regex"));

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));

// Only spans that look like real tags; a decoded "a < b > c" is text, not markup.
static RE_DECODED_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("decoded tag regex"));

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Typographic characters folded to their ASCII look-alikes before the ASCII filter runs.
const SMART_PUNCTUATION: &[(char, &str)] = &[
    ('\u{2019}', "'"),
    ('\u{2018}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{00A0}', " "),
];

/// Remove `<script>`/`<style>`/`<link>` blocks, turn `<br>`, `<p>` and `<div>` into
/// newlines, and drop every other tag while keeping its inner text.
pub fn strip_markup(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let out = RE_BLOCKS.replace_all(raw, "");
    let out = RE_BREAKS.replace_all(&out, "\n");
    RE_TAGS.replace_all(&out, "").into_owned()
}

/// Full cleaning pipeline used for titles and descriptions.
///
/// Never fails; the worst case is an empty string.
pub fn clean_text(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    // 1) Markup
    let stripped = strip_markup(raw);

    // 2) Entities. Double-escaped markup (`&lt;b&gt;`) only becomes visible here,
    //    so drop tag-shaped spans once more, then any stray angle brackets.
    let decoded = html_escape::decode_html_entities(&stripped);
    let mut out = RE_DECODED_TAGS.replace_all(&decoded, "").into_owned();
    out.retain(|c| c != '<' && c != '>');

    // 3) Smart punctuation
    for (from, to) in SMART_PUNCTUATION {
        if out.contains(*from) {
            out = out.replace(*from, to);
        }
    }

    // 4) Printable ASCII only (whitespace survives until the collapse below)
    out.retain(|c| c.is_ascii_graphic() || c == ' ' || matches!(c, '\t' | '\n' | '\r' | '\x0C'));

    // 5) Collapse whitespace
    RE_WS.replace_all(&out, " ").trim().to_string()
}
