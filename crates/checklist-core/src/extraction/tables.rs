//! Table path: word-processor table rows.
//!
//! Wide rows (four or more cells) follow the regulatory form layout
//! `[number][question][clause][answer box]`. Narrow rows are either a numbered
//! question or a `[question][answer hint]` pair.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::classify::{classify_table_hint, is_required, is_standalone_numbering};
use super::cleanup::{collapse_whitespace, is_cover_page, is_non_content};
use super::lines::is_continuation;
use super::options::hint_options;
use crate::types::{BlockKind, ChecklistItem, ItemType, TextBlock};

const MIN_QUESTION_LEN: usize = 10;

const HEADER_TEXTS: &[&str] = &[
    "text",
    "description",
    "ucits application form",
    "application form",
    "checklist",
    "guidance",
    "section",
    "question",
    "item",
    "requirement",
];

static VALID_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,2}$").unwrap());

static SUB_QUESTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([a-zA-Z])\)").unwrap());

static ALT_SUB_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)([a-zA-Z])\)").unwrap());

static LEADING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[\.\)]").unwrap());

/// Whether a question number cell holds `1`, `1.2` or `1.2.3`.
pub fn is_valid_question_number(text: &str) -> bool {
    VALID_NUMBER.is_match(text.trim())
}

/// Turn a question number into an id fragment: `3.1.` becomes `3_1`.
pub fn clean_question_number(number: &str) -> String {
    let cleaned = number
        .trim()
        .trim_end_matches(['.', ')', ':'])
        .trim_matches(['(', ')'])
        .replace('.', "_")
        .replace(' ', "_")
        .to_lowercase();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

const HEADER_NUMBERS: &[&str] = &["no.", "no", "number", "ref", "ref.", "#"];

/// Column headers, generic document titles and fully empty rows.
pub fn is_header_row(number: &str, text: &str) -> bool {
    let number = number.trim().to_lowercase();
    let text = text.trim().to_lowercase();
    (text.contains("question") && text.contains("number"))
        || (text.contains("item") && text.contains("description"))
        || (text.contains("clause") && text.contains("number"))
        || HEADER_TEXTS.contains(&text.as_str())
        || number == "no."
        || number == "number"
        || number.contains("question")
        || (number.is_empty() && text.is_empty())
}

/// Items from every table row block.
pub(crate) fn extract_tables(blocks: &[TextBlock]) -> Vec<ChecklistItem> {
    let mut items: Vec<ChecklistItem> = Vec::new();

    for block in blocks.iter().filter(|b| b.kind == BlockKind::TableRow) {
        let cells: Vec<String> = block.cells.iter().map(|c| collapse_whitespace(c)).collect();
        match cells.len() {
            n if n >= 4 => wide_row(&cells[0], &cells[1], &mut items),
            2 | 3 => narrow_row(&cells[0], &cells[1], &mut items),
            _ => {}
        }
    }
    items
}

fn wide_row(number: &str, text: &str, items: &mut Vec<ChecklistItem>) {
    if text.chars().count() < MIN_QUESTION_LEN
        || is_header_row(number, text)
        || is_cover_page(text)
        || is_cover_page(number)
    {
        return;
    }
    if !is_valid_question_number(number) {
        debug!(number, "Skipping table row without a question number");
        return;
    }
    items.extend(numbered_question(number, text));
}

fn narrow_row(left: &str, right: &str, items: &mut Vec<ChecklistItem>) {
    let numbered = is_valid_question_number(left) || is_standalone_numbering(left);
    if numbered && right.chars().count() >= MIN_QUESTION_LEN {
        if is_header_row(left, right) || is_cover_page(right) {
            return;
        }
        items.extend(numbered_question(left, right));
        return;
    }

    if left.chars().count() < 3
        || is_header_row("", left)
        || HEADER_NUMBERS.contains(&left.to_lowercase().as_str())
        || is_non_content(left)
        || is_cover_page(left)
    {
        return;
    }

    if right.is_empty() && is_continuation(left) {
        if let Some(previous) = items.last_mut() {
            previous.text = format!("{} {}", previous.text.trim_end(), left);
            return;
        }
    }

    let item_type = classify_table_hint(right);
    let id = match LEADING_ID.captures(left).and_then(|c| c.get(1)) {
        Some(n) => format!("item_{}", n.as_str()),
        None => format!("item_{:03}", items.len() + 1),
    };
    let options = match item_type {
        ItemType::RadioGroup | ItemType::Dropdown => hint_options(right),
        _ => Vec::new(),
    };
    items.push(
        ChecklistItem::new(id, left, item_type)
            .with_required(is_required(left))
            .with_options(options),
    );
}

/// Split a numbered question into its `(a)`, `(b)` parts when it has more
/// than one, otherwise yield a single item.
fn numbered_question(number: &str, text: &str) -> Vec<ChecklistItem> {
    let display = number.trim();
    let id = clean_question_number(number);

    if let Some(parts) = sub_questions(text, &SUB_QUESTION) {
        return parts
            .into_iter()
            .map(|(letter, body, stem)| {
                sub_item(&id, &letter, format!("{display}({letter}) {body}"), &body, stem)
            })
            .collect();
    }
    if let Some(parts) = sub_questions(text, &ALT_SUB_QUESTION) {
        return parts
            .into_iter()
            .map(|(letter, body, stem)| {
                sub_item(&id, &letter, format!("{display}{letter}) {body}"), &body, stem)
            })
            .collect();
    }

    vec![ChecklistItem::new(format!("item_{id}"), format!("{display} {text}"), ItemType::Boolean)
        .with_required(is_required(text))]
}

fn sub_item(id: &str, letter: &str, text: String, body: &str, stem: &str) -> ChecklistItem {
    ChecklistItem::new(format!("item_{id}_{letter}"), text, ItemType::Boolean)
        .with_description(stem)
        .with_required(is_required(body))
}

/// `(letter, body, stem)` for each marker, or `None` with fewer than two.
fn sub_questions<'a>(text: &'a str, marker: &Regex) -> Option<Vec<(String, String, &'a str)>> {
    let marks: Vec<(usize, usize, String)> = marker
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let letter = c.get(1)?.as_str().to_lowercase();
            Some((whole.start(), whole.end(), letter))
        })
        .collect();
    if marks.len() < 2 {
        return None;
    }

    let stem = text[..marks[0].0].trim().trim_end_matches(':').trim();
    let parts: Vec<_> = marks
        .iter()
        .enumerate()
        .filter_map(|(i, (_, end, letter))| {
            let stop = marks.get(i + 1).map_or(text.len(), |next| next.0);
            let body = text[*end..stop].trim();
            (!body.is_empty()).then(|| (letter.clone(), body.to_string(), stem))
        })
        .collect();
    (parts.len() > 1).then_some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> TextBlock {
        TextBlock::table_row(cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_valid_question_numbers() {
        for n in ["3", "3.1", "3.1.1", " 12 "] {
            assert!(is_valid_question_number(n), "{n}");
        }
        for n in ["3.1.1.1", "a", "1.", "No.", ""] {
            assert!(!is_valid_question_number(n), "{n}");
        }
    }

    #[test]
    fn test_clean_question_number() {
        assert_eq!(clean_question_number("3.1.1"), "3_1_1");
        assert_eq!(clean_question_number(" (4) "), "4");
        assert_eq!(clean_question_number("2.1:"), "2_1");
        assert_eq!(clean_question_number("  "), "unknown");
    }

    #[test]
    fn test_header_rows() {
        assert!(is_header_row("No.", "Requirement text"));
        assert!(is_header_row("", "Question number"));
        assert!(is_header_row("1", "Application Form"));
        assert!(is_header_row("", ""));
        assert!(!is_header_row("1", "Provide the name of the fund"));
    }

    #[test]
    fn test_wide_rows() {
        let items = extract_tables(&[
            row(&["No.", "Question text", "Clause", ""]),
            row(&["3.1.1", "The Deed is available for inspection", "Reg 12", ""]),
            row(&["", "Continuation without a number here", "", ""]),
            row(&["4", "Short", "", ""]),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "item_3_1_1");
        assert_eq!(items[0].text, "3.1.1 The Deed is available for inspection");
        assert_eq!(items[0].item_type, ItemType::Boolean);
    }

    #[test]
    fn test_sub_questions() {
        let items = extract_tables(&[row(&[
            "5.2",
            "Confirm that: (a) the depositary is independent (b) the auditor is appointed",
            "",
            "",
        ])]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "item_5_2_a");
        assert_eq!(items[0].text, "5.2(a) the depositary is independent");
        assert_eq!(items[0].description.as_deref(), Some("Confirm that"));
        assert_eq!(items[1].id, "item_5_2_b");
    }

    #[test]
    fn test_alternative_sub_questions() {
        let items = extract_tables(&[row(&[
            "6",
            "a) the fund is authorised b) the prospectus is current",
            "",
            "",
        ])]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text, "6b) the prospectus is current");
    }

    #[test]
    fn test_hint_rows() {
        let items = extract_tables(&[
            row(&["Question", "Answer"]),
            row(&["1. Is the fund authorised?", "Yes/No"]),
            row(&["Fund structure", "a) UCITS b) AIF"]),
            row(&["Registered office address", ""]),
        ]);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "item_1");
        assert_eq!(items[0].item_type, ItemType::Boolean);
        assert_eq!(items[1].id, "item_002");
        assert_eq!(items[1].item_type, ItemType::RadioGroup);
        assert_eq!(items[1].options, vec!["UCITS", "AIF"]);
        assert_eq!(items[2].item_type, ItemType::Text);
    }

    #[test]
    fn test_numbered_narrow_row() {
        let items = extract_tables(&[row(&["2.4", "Provide details of the investment manager"])]);
        assert_eq!(items[0].id, "item_2_4");
        assert_eq!(items[0].text, "2.4 Provide details of the investment manager");
    }

    #[test]
    fn test_narrow_continuation_merges() {
        let items = extract_tables(&[
            row(&["Details of the depositary", ""]),
            row(&["including its registered office", ""]),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].text,
            "Details of the depositary including its registered office"
        );
    }
}
