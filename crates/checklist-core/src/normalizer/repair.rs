//! Truncated JSON repair.

use super::scan::{close_positions, closer_for, strip_trailing_commas, unclosed_openers};

/// How many structural closes, counted from the end, a repair will try.
const MAX_REPAIR_ATTEMPTS: usize = 64;

/// Whether `text` parses completely as a JSON array or object.
pub fn is_complete_json(text: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(text.trim()),
        Ok(serde_json::Value::Array(_) | serde_json::Value::Object(_))
    )
}

/// Repair JSON that was cut off mid-stream.
///
/// Starts at the first opening delimiter, cuts back to a structural close
/// outside any string, drops trailing commas, then appends the missing closers
/// in nesting order. Later closes are tried first so the most content survives.
/// Returns `None` when no cut point yields valid JSON.
pub fn repair_truncated(text: &str) -> Option<String> {
    let start = text.find(['[', '{'])?;
    let body = &text[start..];

    for end in close_positions(body)
        .into_iter()
        .rev()
        .take(MAX_REPAIR_ATTEMPTS)
    {
        let mut repaired = strip_trailing_commas(&body[..=end]);
        for opener in unclosed_openers(&repaired).into_iter().rev() {
            repaired.push(closer_for(opener));
        }
        if is_complete_json(&repaired) {
            return Some(repaired);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_is_complete_json() {
        assert!(is_complete_json(r#"[{"a": 1}]"#));
        assert!(is_complete_json(r#"  {"a": 1}  "#));
        assert!(!is_complete_json(r#"[{"a": 1}"#));
        assert!(!is_complete_json("42"));
    }

    #[test]
    fn test_repair_keeps_complete_elements() {
        let text = r#"[{"id": "a", "text": "First"}, {"id": "b", "text": "Second"}, {"id": "c", "text": "Thi"#;
        let repaired = repair_truncated(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["id"], "b");
    }

    #[test]
    fn test_repair_nested_closers() {
        let text = r#"{"items": [{"id": "a", "options": ["Yes", "No"]}, {"id": "b", "options": ["x"#;
        let repaired = repair_truncated(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["items"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_repair_ignores_brackets_in_strings() {
        let text = r#"[{"text": "see [note] and {x}"}, {"text": "cut [off"#;
        let repaired = repair_truncated(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value[0]["text"], "see [note] and {x}");
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_repair_strips_trailing_comma() {
        let repaired = repair_truncated(r#"[1, 2, 3,]"#).unwrap();
        assert_eq!(repaired, "[1, 2, 3]");
    }

    #[test]
    fn test_repair_nothing_complete() {
        assert_eq!(repair_truncated(r#"[{"id": "a", "text": "unfinished"#), None);
        assert_eq!(repair_truncated("no json here"), None);
    }
}
