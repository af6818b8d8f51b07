//! Sheet path: spreadsheet rows, first row as headers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::classify::{
    classify_question, contains_question_keywords, has_multiple_options,
    is_obvious_non_question, is_required, is_standalone_numbering, looks_like_question,
};
use super::cleanup::{capitalize_first, collapse_whitespace};
use super::options::question_options;
use crate::types::{BlockKind, ChecklistItem, ItemType, TextBlock};

/// How far right of a numbering cell its question text may sit.
const NUMBERING_LOOKAHEAD: usize = 2;
const GENERIC_SCAN_ROWS: usize = 10;
const GENERIC_MAX_ITEMS: usize = 20;

static LEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+|[a-zA-Z])[\.\)]\s+").unwrap());

static LEADING_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-*○●]\s*").unwrap());

/// Collapse whitespace, drop a single-level marker and bullet, capitalize.
pub fn clean_question_text(text: &str) -> String {
    let text = collapse_whitespace(text);
    let text = LEADING_MARKER.replace(&text, "");
    let text = LEADING_BULLET.replace(&text, "");
    capitalize_first(text.trim())
}

/// Items from every spreadsheet row block.
pub(crate) fn extract_sheet(blocks: &[TextBlock]) -> Vec<ChecklistItem> {
    let rows: Vec<&TextBlock> = blocks
        .iter()
        .filter(|b| b.kind == BlockKind::SheetRow)
        .collect();
    let Some((header_row, data)) = rows.split_first() else {
        return Vec::new();
    };

    let headers: Vec<String> = header_row
        .cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.trim() {
            "" => format!("Column_{}", i + 1),
            header => header.to_string(),
        })
        .collect();

    let mut items = Vec::new();
    for row in data {
        let mut cells: Vec<String> = row.cells.iter().map(|c| c.trim().to_string()).collect();
        cells.resize(headers.len(), String::new());

        let before = items.len();
        row_items(&cells, &mut items);
        if items.len() == before {
            if let Some(item) = row_fallback(&row.cells, items.len() + 1) {
                items.push(item);
            }
        }
    }

    if items.is_empty() {
        items = generic_items(&headers, data);
    }
    items
}

/// Two passes over one row: numbered and question-like cells first, then
/// leftover cells with question keywords.
fn row_items(cells: &[String], items: &mut Vec<ChecklistItem>) {
    let mut used = vec![false; cells.len()];

    for col in 0..cells.len() {
        let content = cells[col].as_str();
        if used[col] || content.is_empty() {
            continue;
        }

        if is_standalone_numbering(content) {
            used[col] = true;
            let end = cells.len().min(col + 1 + NUMBERING_LOOKAHEAD);
            let partner = (col + 1..end).find(|&next| {
                let text = cells[next].as_str();
                !used[next]
                    && !text.is_empty()
                    && (looks_like_question(text)
                        || (text.chars().count() > 10 && !is_standalone_numbering(text)))
            });
            if let Some(next) = partner {
                used[next] = true;
                let combined = format!("{content} {}", cells[next]);
                push_analyzed(&combined, items);
            }
            continue;
        }

        let len = content.chars().count();
        if looks_like_question(content)
            || (len > 15 && has_multiple_options(content))
            || (len > 20 && contains_question_keywords(content))
        {
            used[col] = true;
            push_analyzed(content, items);
        }
    }

    for col in 0..cells.len() {
        let content = cells[col].as_str();
        if !used[col]
            && content.chars().count() > 8
            && !is_obvious_non_question(content)
            && contains_question_keywords(content)
        {
            push_analyzed(content, items);
        }
    }
}

fn push_analyzed(content: &str, items: &mut Vec<ChecklistItem>) {
    if let Some(item) = analyze_content(content, format!("item_{:03}", items.len() + 1)) {
        items.push(item);
    }
}

fn analyze_content(content: &str, id: String) -> Option<ChecklistItem> {
    let content = content.trim();
    if content.chars().count() < 3
        || is_obvious_non_question(content)
        || is_standalone_numbering(content)
    {
        return None;
    }
    Some(build_item(content, id))
}

fn build_item(content: &str, id: String) -> ChecklistItem {
    let mut item_type = classify_question(content);
    let mut options = Vec::new();

    if item_type.is_choice() {
        options = question_options(content);
        if options.is_empty() {
            item_type = ItemType::Boolean;
        }
    }
    if item_type == ItemType::Boolean {
        options = vec!["Yes".to_string(), "No".to_string()];
    }

    ChecklistItem::new(id, clean_question_text(content), item_type)
        .with_required(is_required(content))
        .with_options(options)
}

/// A row the passes found nothing in still yields one item from its joined
/// cells, as long as it holds any letters.
fn row_fallback(cells: &[String], index: usize) -> Option<ChecklistItem> {
    let joined = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(build_item(&joined, format!("item_{index:03}")))
}

fn generic_items(headers: &[String], data: &[&TextBlock]) -> Vec<ChecklistItem> {
    let mut items: Vec<ChecklistItem> = headers
        .iter()
        .filter(|h| !h.starts_with("Column_") && looks_like_question(h))
        .enumerate()
        .map(|(i, header)| build_item(header, format!("header_item_{}", i + 1)))
        .collect();
    if !items.is_empty() {
        return items;
    }

    let cells = data
        .iter()
        .take(GENERIC_SCAN_ROWS)
        .flat_map(|row| row.cells.iter().take(headers.len()))
        .map(|c| c.trim())
        .filter(|c| looks_like_question(c));
    for content in cells.take(GENERIC_MAX_ITEMS) {
        let id = format!("content_item_{}", items.len() + 1);
        items.push(build_item(content, id));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<TextBlock> {
        rows.iter()
            .map(|r| TextBlock::sheet_row(r.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_clean_question_text() {
        assert_eq!(clean_question_text("  1.  what   is the name"), "What is the name");
        assert_eq!(clean_question_text("a) choose one"), "Choose one");
        assert_eq!(clean_question_text("• tick all"), "Tick all");
        assert_eq!(clean_question_text("1.1 Fund name"), "1.1 Fund name");
    }

    #[test]
    fn test_numbering_combines_with_question() {
        let items = extract_sheet(&sheet(&[
            &["No.", "Question", "Answer"],
            &["1.1", "What is the name of the fund?", ""],
        ]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "item_001");
        assert_eq!(items[0].text, "1.1 What is the name of the fund?");
        assert_eq!(items[0].item_type, ItemType::Text);
    }

    #[test]
    fn test_choice_without_options_becomes_boolean() {
        let items = extract_sheet(&sheet(&[
            &["Question"],
            &["Select all that apply to the fund"],
        ]));
        assert_eq!(items[0].item_type, ItemType::Boolean);
        assert_eq!(items[0].options, vec!["Yes", "No"]);
    }

    #[test]
    fn test_radio_question_gets_options() {
        let items = extract_sheet(&sheet(&[
            &["Question"],
            &["Dealing frequency: 1) Daily 2) Weekly 3) Monthly"],
        ]));
        assert_eq!(items[0].item_type, ItemType::RadioGroup);
        assert_eq!(items[0].options, vec!["Daily", "Weekly", "Monthly"]);
    }

    #[test]
    fn test_ragged_rows_yield_an_item_per_row() {
        let items = extract_sheet(&sheet(&[
            &["A", "B"],
            &["Fund"],
            &["Ireland", "2021", "extra", "cells", "beyond", "the", "header"],
            &[],
            &["", "Do you hold client money?"],
            &["42"],
        ]));
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].item_type, ItemType::Boolean);
    }

    #[test]
    fn test_header_fallback() {
        let items = extract_sheet(&sheet(&[&["What is the fund name?", "Column notes"]]));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "header_item_1");
    }

    #[test]
    fn test_no_sheet_rows() {
        assert!(extract_sheet(&[TextBlock::paragraph("Not a sheet")]).is_empty());
    }
}
