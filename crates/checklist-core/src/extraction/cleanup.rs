//! Text cleanup rules.
//!
//! Each rule is a pure `&str -> String` function. [`clean_line`] composes the
//! marker rules in their fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-•*○●]\s*").unwrap());

static MULTI_LEVEL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)*").unwrap());

static SIMPLE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9]\d*\.\s+").unwrap());

static LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]\)\s*").unwrap());

static ROMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVX]+\.\s*").unwrap());

static PARENTHESIZED_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\([0-9]+\)\s*").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static NON_CONTENT: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^(page|section|chapter|appendix|figure|table|exhibit)\s+[0-9]").unwrap(),
        Regex::new(r"(?i)^(copyright|©|all rights reserved)").unwrap(),
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(),
        Regex::new(r"^[A-Z\s]{10,}$").unwrap(),
        Regex::new(r"^_{3,}|^-{3,}|^={3,}").unwrap(),
        Regex::new(r"(?i)^(continued|cont\.?|see above|see below|n/a|not applicable)$").unwrap(),
    ]
});

static COVER_PAGE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\s*$").unwrap());

const COVER_PAGE_EXACT: &[&str] = &[
    "cover page",
    "title page",
    "document control",
    "confidential",
    "internal use only",
    "draft version",
    "final version",
];

const COVER_PAGE_CONTROL: &[&str] = &[
    "prepared by:",
    "reviewed by:",
    "approved by:",
    "version number:",
    "document version:",
];

/// Remove a leading bullet.
pub fn strip_bullets(text: &str) -> String {
    BULLET.replace(text, "").trim().to_string()
}

/// Remove single-level decimal numbering in front of a capitalized word.
///
/// Multi-level prefixes such as `3.1.1` are clause references and stay.
pub fn strip_simple_numbering(text: &str) -> String {
    if MULTI_LEVEL_NUMBER.is_match(text) {
        return text.to_string();
    }
    if let Some(m) = SIMPLE_NUMBER.find(text) {
        let rest = &text[m.end()..];
        if rest.starts_with(|c: char| c.is_uppercase()) {
            return rest.trim().to_string();
        }
    }
    text.to_string()
}

/// Remove a leading `a)` marker.
pub fn strip_lettered(text: &str) -> String {
    LETTERED.replace(text, "").trim().to_string()
}

/// Remove a leading roman numeral marker such as `IV.`.
pub fn strip_roman(text: &str) -> String {
    ROMAN.replace(text, "").trim().to_string()
}

/// Remove a leading `(1)` marker.
pub fn strip_parenthesized(text: &str) -> String {
    PARENTHESIZED_NUMBER.replace(text, "").trim().to_string()
}

/// Strip list markers from a line in the fixed rule order.
pub fn clean_line(text: &str) -> String {
    const RULES: &[fn(&str) -> String] = &[
        strip_bullets,
        strip_simple_numbering,
        strip_lettered,
        strip_roman,
        strip_parenthesized,
    ];
    RULES
        .iter()
        .fold(text.trim().to_string(), |acc, rule| rule(&acc))
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Uppercase the first character.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

/// Lowercase the first character.
pub fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

/// Page furniture, separators, dates and banners that never form an item.
pub fn is_non_content(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || NON_CONTENT.iter().any(|re| re.is_match(text))
}

/// Cover-page and document-control text.
pub fn is_cover_page(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    COVER_PAGE_EXACT.contains(&lower.as_str())
        || COVER_PAGE_CONTROL.iter().any(|p| lower.starts_with(p))
        || COVER_PAGE_DATE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_simple_numbering_preserves_clauses() {
        assert_eq!(
            strip_simple_numbering("3.1.1 The Deed is available"),
            "3.1.1 The Deed is available"
        );
        assert_eq!(strip_simple_numbering("2.4 Scope"), "2.4 Scope");
        assert_eq!(
            strip_simple_numbering("1. Something Capitalized"),
            "Something Capitalized"
        );
        assert_eq!(strip_simple_numbering("1. lower case"), "1. lower case");
        assert_eq!(strip_simple_numbering("0. Zero"), "0. Zero");
    }

    #[test]
    fn test_clean_line_pipeline() {
        assert_eq!(clean_line("  - Provide the fund name"), "Provide the fund name");
        assert_eq!(clean_line("• 2. Confirm the depositary"), "Confirm the depositary");
        assert_eq!(clean_line("b) Enter the address"), "Enter the address");
        assert_eq!(clean_line("IV. Governance"), "Governance");
        assert_eq!(clean_line("(3) Attach the prospectus"), "Attach the prospectus");
        assert_eq!(clean_line("3.1.1 The Deed"), "3.1.1 The Deed");
    }

    #[test]
    fn test_non_content() {
        assert!(is_non_content("Page 3 of 10"));
        assert!(is_non_content("copyright 2024 Example Ltd"));
        assert!(is_non_content("2024-01-31 draft"));
        assert!(is_non_content("APPLICATION FORM SECTION"));
        assert!(is_non_content("-----"));
        assert!(is_non_content("N/A"));
        assert!(!is_non_content("Provide the name of the fund"));
        assert!(!is_non_content("Short CAPS"));
    }

    #[test]
    fn test_cover_page() {
        assert!(is_cover_page("Confidential"));
        assert!(is_cover_page("Prepared by: Compliance"));
        assert!(is_cover_page("12/03/2024"));
        assert!(!is_cover_page("Is the document confidential?"));
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(capitalize_first("is it"), "Is it");
        assert_eq!(lowercase_first("The fund"), "the fund");
        assert_eq!(capitalize_first(""), "");
    }
}
