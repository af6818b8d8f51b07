//! Title and description cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::collapse_whitespace;

static NUMBER_ARTIFACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[\.\)]\s*").unwrap());
static LETTER_ARTIFACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][\.\)]\s+").unwrap());

pub const UNTITLED: &str = "Untitled question";

/// Collapse whitespace and drop a leftover single-level numbering prefix.
///
/// Multi-level prefixes such as `3.1.1` are kept.
pub fn clean_text(raw: &str) -> String {
    let text = collapse_whitespace(raw);
    for artifact in [&*NUMBER_ARTIFACT, &*LETTER_ARTIFACT] {
        if let Some(m) = artifact.find(&text) {
            let rest = &text[m.end()..];
            if !rest.starts_with(|c: char| c.is_ascii_digit()) {
                return rest.to_string();
            }
        }
    }
    text
}

pub fn clean_title(raw: &str) -> String {
    let title = clean_text(raw);
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}
