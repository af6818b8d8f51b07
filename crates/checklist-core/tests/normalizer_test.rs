//! Normalizer properties over realistic model output.

use checklist_core::extraction::parse_items;
use checklist_core::{normalize_value, Expected, ItemType};
use serde_json::{json, Value};

fn sample_items(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| {
            json!({
                "id": format!("item_{i}"),
                "text": format!("Confirm that control {i} is documented, tested and signed off"),
                "type": if i % 2 == 0 { "Boolean" } else { "Checkbox" },
                "isRequired": i % 3 == 0,
                "options": [],
            })
        })
        .collect()
}

/// Array text plus the byte offset just past each element.
fn array_with_ends(items: &[Value]) -> (String, Vec<usize>) {
    let mut text = String::from("[");
    let mut ends = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        text.push_str(&item.to_string());
        ends.push(text.len());
    }
    text.push(']');
    (text, ends)
}

#[test]
fn test_every_truncation_keeps_complete_elements() {
    let items = sample_items(5);
    let (full, ends) = array_with_ends(&items);

    for cut in ends[0]..full.len() {
        let complete = ends.iter().filter(|&&end| end <= cut).count();
        let value = normalize_value(&full[..cut], Expected::Array)
            .unwrap_or_else(|e| panic!("cut at {cut} failed: {e}"));
        let recovered = value.as_array().expect("array");

        assert!(
            recovered.len() >= complete,
            "cut at {cut}: {} < {complete}",
            recovered.len()
        );
        assert!(recovered.len() <= complete + 1);
        assert_eq!(&recovered[..complete], &items[..complete], "cut at {cut}");
    }
}

#[test]
fn test_wrapped_responses_recover_the_same_array() {
    let items = sample_items(3);
    let (array, _) = array_with_ends(&items);
    let pretty = serde_json::to_string_pretty(&Value::Array(items.clone())).unwrap();

    let wrappers = [
        array.clone(),
        format!("Here is your checklist:\n\n{array}\n\nLet me know if you need changes."),
        format!("```json\n{pretty}\n```"),
        format!("<think>The document has [three] controls.</think>\n```\n{array}\n```"),
        format!("Answer: {array}"),
        format!(r#"{{"items": {array}}}"#),
    ];

    for raw in &wrappers {
        let value = normalize_value(raw, Expected::Array)
            .unwrap_or_else(|e| panic!("failed on {raw:?}: {e}"));
        assert_eq!(value, Value::Array(items.clone()), "input {raw:?}");
    }
}

#[test]
fn test_normalized_output_parses_into_items() {
    let raw = r#"Sure.
```json
[
  {"ID": "kyc", "Question": "Is KYC complete?", "Type": "yes/no", "Required": "yes"},
  {"id": "venue", "title": "Trading venue", "type": "select", "choices": ["LSE", "NYSE", 3]},
  "Confirm the annual report is filed",
  {"id": "notes", "text": "Notes", "type": "textarea"}
"#;
    let value = tokio_test::assert_ok!(normalize_value(raw, Expected::Array));
    let items = parse_items(&value);

    assert_eq!(items.len(), 4);
    assert_eq!(items[0].item_type, ItemType::Boolean);
    assert!(items[0].is_required);
    assert_eq!(items[1].item_type, ItemType::Dropdown);
    assert_eq!(items[1].options, vec!["LSE", "NYSE", "3"]);
    assert_eq!(items[2].item_type, ItemType::Checkbox);
    assert_eq!(items[3].item_type, ItemType::Comment);
}

#[test]
fn test_prose_without_json_is_an_error() {
    for raw in ["", "No items could be identified.", "<think>[maybe]</think>"] {
        assert!(normalize_value(raw, Expected::Array).is_err(), "{raw:?}");
    }
}
