//! Response JSON normalizer.
//!
//! Models wrap their JSON in prose, reasoning tags and code fences, and
//! sometimes stop mid-array when they hit the token limit. The normalizer
//! recovers the intended JSON through a fixed sequence of strategies and
//! validates every candidate with a full parse before returning it.
//!
//! 1. Direct: strip `<think>` tags, try fenced blocks, then the whole text.
//! 2. Final-answer markers (`answer:`, `result:`, `json:`).
//! 3. Balanced-region scan, last region first.
//! 4. Truncation repair.
//! 5. Reinterpretation: an object where an array was expected.

mod repair;
mod scan;

pub use repair::{is_complete_json, repair_truncated};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ChecklistError, ChecklistResult, ErrorCode};
use scan::balanced_regions;

/// Result alias for normalizer operations.
pub type NormalizerResult<T> = ChecklistResult<T>;

/// Scan candidates shorter than this are ignored when there are several.
const MIN_SCAN_CANDIDATE_LEN: usize = 100;

static THINK_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").unwrap());

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());

static ANSWER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:final answer|answer|result|json)\s*:\s*").unwrap());

/// JSON shape the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Array,
    Object,
}

impl Expected {
    fn opener(&self) -> u8 {
        match self {
            Expected::Array => b'[',
            Expected::Object => b'{',
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Expected::Array => value.is_array(),
            Expected::Object => value.is_object(),
        }
    }
}

struct Candidate<'a> {
    text: std::borrow::Cow<'a, str>,
    strategy: &'static str,
    allow_empty: bool,
}

impl<'a> Candidate<'a> {
    fn borrowed(text: &'a str, strategy: &'static str, allow_empty: bool) -> Self {
        Self {
            text: std::borrow::Cow::Borrowed(text),
            strategy,
            allow_empty,
        }
    }
}

/// Normalize a raw model response into JSON text of the expected kind.
pub fn normalize(raw: &str, expected: Expected) -> NormalizerResult<String> {
    let value = normalize_value(raw, expected)?;
    Ok(serde_json::to_string(&value)?)
}

/// Normalize a raw model response into a parsed JSON value of the expected kind.
pub fn normalize_value(raw: &str, expected: Expected) -> NormalizerResult<Value> {
    let cleaned = THINK_TAGS.replace_all(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ChecklistError::Normalization {
            message: "Response was empty".to_string(),
            code: ErrorCode::NormNoJson,
        });
    }

    let candidates = collect_candidates(cleaned, expected);

    for candidate in &candidates {
        let Some(value) = parse_as(&candidate.text, expected) else {
            continue;
        };
        if !candidate.allow_empty && is_empty_container(&value) {
            continue;
        }
        if candidate.strategy == "repair" {
            warn!("Recovered truncated JSON response");
        } else {
            debug!(strategy = candidate.strategy, "Normalized response");
        }
        return Ok(value);
    }

    if expected == Expected::Array {
        for candidate in &candidates {
            if let Some(value) = reinterpret_as_array(&candidate.text) {
                warn!(
                    strategy = candidate.strategy,
                    "Expected an array, reinterpreted an object response"
                );
                return Ok(value);
            }
        }
    }

    let has_structure = cleaned.contains(['[', '{']);
    Err(ChecklistError::Normalization {
        message: if has_structure {
            format!("Could not recover valid JSON from a {}-char response", cleaned.len())
        } else {
            "Response contains no JSON".to_string()
        },
        code: if has_structure {
            ErrorCode::NormUnrepairable
        } else {
            ErrorCode::NormNoJson
        },
    })
}

fn collect_candidates(text: &str, expected: Expected) -> Vec<Candidate<'_>> {
    let mut candidates = Vec::new();

    // 1. fences, then the text as-is
    for captures in CODE_FENCE.captures_iter(text) {
        if let Some(body) = captures.get(1) {
            candidates.push(Candidate::borrowed(body.as_str(), "fence", true));
        }
    }
    candidates.push(Candidate::borrowed(text, "direct", true));

    // 2. markers
    for marker in ANSWER_MARKER.find_iter(text) {
        let start = marker.end();
        if text.as_bytes().get(start) == Some(&expected.opener()) {
            if let Some(end) = scan::balanced_end(text, start) {
                candidates.push(Candidate::borrowed(&text[start..end], "marker", true));
            }
        }
    }

    // 3. balanced regions, last first
    let regions = balanced_regions(text);
    let only_region = regions.len() == 1;
    for region in regions.iter().rev() {
        if !only_region && region.len() < MIN_SCAN_CANDIDATE_LEN {
            continue;
        }
        candidates.push(Candidate::borrowed(region.as_str(text), "scan", false));
    }

    // 4. repair, from the first delimiter of any kind and of the expected kind
    if let Some(repaired) = repair_truncated(text) {
        candidates.push(Candidate {
            text: std::borrow::Cow::Owned(repaired),
            strategy: "repair",
            allow_empty: false,
        });
    }
    if let Some(start) = text.find(expected.opener() as char) {
        if let Some(repaired) = repair_truncated(&text[start..]) {
            candidates.push(Candidate {
                text: std::borrow::Cow::Owned(repaired),
                strategy: "repair",
                allow_empty: false,
            });
        }
    }

    candidates
}

fn parse_as(text: &str, expected: Expected) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(|v| expected.matches(v))
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => true,
    }
}

/// Read an object as an array: a wrapper like `{"items": [...]}` yields its
/// list, any other object becomes a one-element array.
fn reinterpret_as_array(text: &str) -> Option<Value> {
    let Value::Object(map) = serde_json::from_str::<Value>(text.trim()).ok()? else {
        return None;
    };
    if map.is_empty() {
        return None;
    }
    let wrapped = map.values().find_map(|v| match v {
        Value::Array(list) if !list.is_empty() && list.iter().all(Value::is_object) => {
            Some(v.clone())
        }
        _ => None,
    });
    Some(wrapped.unwrap_or_else(|| Value::Array(vec![Value::Object(map)])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_json(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"id": "item_{i:03}", "text": "Confirm requirement number {i} is satisfied", "type": "Checkbox"}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(", "))
    }

    #[test]
    fn test_plain_array() {
        let value = normalize_value(r#"[{"id": "a"}]"#, Expected::Array).unwrap();
        assert_eq!(value[0]["id"], "a");
    }

    #[test]
    fn test_fenced_array_with_think_tags() {
        let raw = format!(
            "<think>Let me consider [this] carefully</think>\nSure!\n```json\n{}\n```\nDone.",
            items_json(2)
        );
        let value = normalize_value(&raw, Expected::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_array_embedded_in_prose() {
        let raw = format!(
            "I found these items {{see below}}: {} Hope this helps [1].",
            items_json(3)
        );
        let value = normalize_value(&raw, Expected::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_final_answer_marker() {
        let raw = r#"Thinking about [a] and [b]... Final answer: [{"id": "x"}] (end)"#;
        let value = normalize_value(raw, Expected::Array).unwrap();
        assert_eq!(value[0]["id"], "x");
    }

    #[test]
    fn test_truncated_array_preserves_complete_elements() {
        let full = items_json(4);
        let cut = &full[..full.len() - 30];
        let value = normalize_value(cut, Expected::Array).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["id"], "item_002");
    }

    #[test]
    fn test_string_array() {
        let value = normalize_value(r#"["Check A", "Check B"]"#, Expected::Array).unwrap();
        assert_eq!(value[1], "Check B");
    }

    #[test]
    fn test_single_object_wrapped() {
        let value = normalize_value(r#"{"id": "only", "text": "One"}"#, Expected::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["id"], "only");
    }

    #[test]
    fn test_items_wrapper_unwrapped() {
        let value =
            normalize_value(r#"{"items": [{"id": "a"}, {"id": "b"}]}"#, Expected::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_object_expected() {
        let text = normalize(r#"Result: {"ok": true}"#, Expected::Object).unwrap();
        assert_eq!(text, r#"{"ok":true}"#);
    }

    #[test]
    fn test_failure_never_returns_malformed_text() {
        let err = normalize("I could not find any checklist items.", Expected::Array).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NormNoJson);

        let err = normalize(r#"[{"id": "a", "text": "never closed"#, Expected::Array).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NormUnrepairable);
    }

    #[test]
    fn test_empty_response() {
        assert!(normalize("  <think>hmm</think> ", Expected::Array).is_err());
    }
}
