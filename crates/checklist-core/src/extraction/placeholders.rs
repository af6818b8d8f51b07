//! Informative items that stand in for a failed or empty extraction.

use crate::types::{ChecklistItem, ItemType};

pub const NO_ITEMS_FOUND_ID: &str = "no_items_found";
pub const FALLBACK_NOTE_ID: &str = "fallback_note";

const BASIC_MAX_ITEMS: usize = 10;
const BASIC_MIN_LEN: usize = 10;
const BASIC_MAX_LEN: usize = 100;

/// Rule extraction produced nothing.
pub fn no_items_found() -> ChecklistItem {
    ChecklistItem::placeholder(
        NO_ITEMS_FOUND_ID,
        "No checklist items were found in this document",
        "The document may not contain recognizable checklist patterns, or may need manual review.",
    )
}

/// The document could not be read.
pub fn document_read_error(error: &str) -> ChecklistItem {
    ChecklistItem::placeholder(
        "document_read_error",
        format!("Unable to process this document: {error}"),
        "The file may be corrupted, password-protected, or contain unsupported formatting.",
    )
}

/// AI extraction was requested without a completion backend.
pub fn configuration_error() -> ChecklistItem {
    ChecklistItem::placeholder(
        "configuration_error",
        "AI extraction is not configured",
        "Set a completion provider and API key, or use rules mode.",
    )
}

/// Every model in the chain was rate limited.
pub fn rate_limit_error() -> ChecklistItem {
    ChecklistItem::placeholder(
        "rate_limit_error",
        "AI service temporarily unavailable due to high demand",
        "The AI models are experiencing high demand. Please try again in a few minutes.",
    )
}

/// Any other AI extraction failure.
pub fn ai_conversion_error(error: &str) -> ChecklistItem {
    ChecklistItem::placeholder(
        "ai_conversion_error",
        format!("Failed to process document with AI: {error}"),
        format!("Error: {error}. Please check the document format and try again."),
    )
}

/// A minimal checklist built from the document's first lines, used when every
/// model failed.
pub fn basic_fallback(text: &str) -> Vec<ChecklistItem> {
    let mut items = vec![ChecklistItem::placeholder(
        FALLBACK_NOTE_ID,
        "AI processing unavailable - manual review required",
        "All AI models are currently unavailable. Please review the document manually and create checklist items as needed.",
    )];

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(BASIC_MAX_ITEMS);

    for (i, line) in lines.enumerate() {
        if line.chars().count() <= BASIC_MIN_LEN {
            continue;
        }
        let text = if line.chars().count() > BASIC_MAX_LEN {
            let head: String = line.chars().take(BASIC_MAX_LEN - 3).collect();
            format!("{head}...")
        } else {
            line.to_string()
        };
        items.push(
            ChecklistItem::new(format!("basic_item_{}", i + 1), text, ItemType::Checkbox)
                .with_description(
                    "Auto-extracted from document - please review and modify as needed",
                ),
        );
    }
    items
}
