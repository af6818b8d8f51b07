//! Line path: prose paragraphs and text lines.

use once_cell::sync::Lazy;
use regex::Regex;

use super::classify::{classify_line, format_label, is_required};
use super::cleanup::{clean_line, collapse_whitespace, is_cover_page, is_non_content};
use super::options::dropdown_options;
use crate::config::ExtractionConfig;
use crate::types::{BlockKind, ChecklistItem, ItemType, TextBlock};

const TABLE_SEPARATOR: &str = "=== TABLE ===";

static LEADING_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+(?:\.\d+)*|[a-zA-Z]|[ivxIVX]+)[\.\)]").unwrap());

/// A paragraph that continues the previous item: lowercase start, no numbering
/// and no colon.
pub(crate) fn is_continuation(text: &str) -> bool {
    text.starts_with(|c: char| c.is_lowercase())
        && !LEADING_NUMBERING.is_match(text)
        && !text.contains(':')
}

/// Walk non-row blocks in order and turn each surviving line into an item.
pub(crate) fn extract_lines(
    blocks: &[TextBlock],
    file_name: &str,
    config: &ExtractionConfig,
) -> Vec<ChecklistItem> {
    let mut items: Vec<ChecklistItem> = Vec::new();
    let mut section: Option<String> = None;

    for block in blocks {
        let text = collapse_whitespace(&block.text());
        if text.is_empty() || text == TABLE_SEPARATOR {
            continue;
        }

        let min_len = match block.kind {
            BlockKind::Heading => {
                section = Some(text);
                continue;
            }
            BlockKind::TableRow | BlockKind::SheetRow => continue,
            _ if text.starts_with('#') => {
                section = Some(text.trim_start_matches('#').trim().to_string());
                continue;
            }
            BlockKind::Paragraph => config.min_paragraph_len,
            BlockKind::Line => config.min_line_len,
        };
        if text.chars().count() < min_len {
            continue;
        }

        if block.kind == BlockKind::Paragraph && is_continuation(&text) {
            if let Some(previous) = items.last_mut() {
                previous.text = format!("{} {}", previous.text.trim_end(), text);
                continue;
            }
        }

        let id = format!("field_{:03}", items.len() + 1);
        if let Some(item) = line_item(&text, id, file_name, section.as_deref()) {
            items.push(item);
        }
    }
    items
}

fn line_item(
    text: &str,
    id: String,
    file_name: &str,
    section: Option<&str>,
) -> Option<ChecklistItem> {
    let clean = clean_line(text);
    if clean.chars().count() < 2 || is_non_content(&clean) || is_cover_page(&clean) {
        return None;
    }

    let item_type = classify_line(&clean);
    let options = if item_type == ItemType::Dropdown {
        dropdown_options(&clean)
    } else {
        Vec::new()
    };

    Some(
        ChecklistItem::new(id, format_label(&clean, item_type), item_type)
            .with_description(describe(section, file_name))
            .with_required(is_required(&clean))
            .with_options(options),
    )
}

fn describe(section: Option<&str>, file_name: &str) -> String {
    match section {
        Some(section) if !section.is_empty() => {
            format!("From section: {section} | Source: {file_name}")
        }
        _ => format!("Extracted from {file_name}"),
    }
}
