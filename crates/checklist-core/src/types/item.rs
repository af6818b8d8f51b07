//! Checklist item types.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Kind of answer a checklist item expects.
///
/// This is a closed tag set. Free-form labels coming from models or from
/// API callers go through [`ItemType::parse_lenient`], which owns the synonym
/// table; anything it does not recognize falls back to a caller-chosen default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, IntoStaticStr,
)]
pub enum ItemType {
    /// Single-line free text.
    Text,
    /// Yes/No question.
    Boolean,
    /// Pick exactly one of several options.
    RadioGroup,
    /// Tick-box confirmation, or pick any of several options.
    Checkbox,
    /// Pick one option from a list.
    Dropdown,
    /// Multi-line free text, also used for informational and error items.
    Comment,
}

impl ItemType {
    /// Default for items produced by AI-assisted extraction.
    pub const AI_DEFAULT: ItemType = ItemType::Checkbox;
    /// Default for items produced by rule-based extraction.
    pub const RULE_DEFAULT: ItemType = ItemType::Text;
    /// Type used by error and informational placeholders.
    pub const PLACEHOLDER: ItemType = ItemType::Comment;

    /// Parse a type label, accepting the usual synonyms case-insensitively.
    ///
    /// Returns `None` when the label is not recognized.
    pub fn parse_lenient(label: &str) -> Option<ItemType> {
        let key: String = label
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        let parsed = match key.as_str() {
            "text" | "textbox" | "textfield" | "input" | "string" => ItemType::Text,
            "boolean" | "bool" | "yes/no" | "yesno" | "yes" | "no" | "truefalse" => {
                ItemType::Boolean
            }
            "radiogroup" | "radio" | "radiobutton" | "radiobuttons" | "singlechoice" => {
                ItemType::RadioGroup
            }
            "checkbox" | "check" | "checkboxes" | "tickbox" | "multiplechoice" => {
                ItemType::Checkbox
            }
            "dropdown" | "select" | "choice" | "combobox" | "list" => ItemType::Dropdown,
            "comment" | "note" | "notes" | "description" | "info" | "textarea" | "multiline" => {
                ItemType::Comment
            }
            _ => return None,
        };
        Some(parsed)
    }

    /// Parse a type label, falling back to `default` when it is not recognized.
    pub fn parse_or(label: &str, default: ItemType) -> ItemType {
        Self::parse_lenient(label).unwrap_or(default)
    }

    /// Whether this type renders a list of options.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ItemType::RadioGroup | ItemType::Checkbox | ItemType::Dropdown
        )
    }

    fn from_index(index: u64) -> Option<ItemType> {
        match index {
            0 => Some(ItemType::Text),
            1 => Some(ItemType::Boolean),
            2 => Some(ItemType::RadioGroup),
            3 => Some(ItemType::Checkbox),
            4 => Some(ItemType::Dropdown),
            5 => Some(ItemType::Comment),
            _ => None,
        }
    }

    /// Interpret an arbitrary JSON value as a type tag.
    ///
    /// Strings go through the synonym table, integers are read as enum ordinals.
    pub fn from_json(value: &serde_json::Value, default: ItemType) -> ItemType {
        match value {
            serde_json::Value::String(s) => Self::parse_or(s, default),
            serde_json::Value::Number(n) => n.as_u64().and_then(Self::from_index).unwrap_or(default),
            _ => default,
        }
    }
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::AI_DEFAULT
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(ItemType::from_json(&value, ItemType::AI_DEFAULT))
    }
}

/// One canonical extracted unit of checklist content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Identifier, unique within one checklist.
    pub id: String,
    /// Prompt shown to the person filling in the checklist.
    pub text: String,
    /// Supplementary context such as source section or error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Answer kind.
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    /// Whether an answer is mandatory.
    #[serde(default)]
    pub is_required: bool,
    /// Answer options for choice types; empty otherwise.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ChecklistItem {
    /// Create a new item.
    pub fn new(id: impl Into<String>, text: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            description: None,
            item_type,
            is_required: false,
            options: Vec::new(),
        }
    }

    /// Create a `Comment` placeholder describing a condition rather than asking a question.
    pub fn placeholder(
        id: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, text, ItemType::PLACEHOLDER).with_description(description)
    }

    /// Set the description. Blank descriptions are dropped.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Set the required flag.
    pub fn with_required(mut self, required: bool) -> Self {
        self.is_required = required;
        self
    }

    /// Whether this item reports a processing problem rather than document content.
    pub fn is_issue(&self) -> bool {
        let id = self.id.to_lowercase();
        id.contains("error") || id.contains("failed") || id.contains("limitation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_lenient_synonyms() {
        assert_eq!(ItemType::parse_lenient("bool"), Some(ItemType::Boolean));
        assert_eq!(ItemType::parse_lenient("Yes/No"), Some(ItemType::Boolean));
        assert_eq!(ItemType::parse_lenient("yesno"), Some(ItemType::Boolean));
        assert_eq!(ItemType::parse_lenient("radio group"), Some(ItemType::RadioGroup));
        assert_eq!(ItemType::parse_lenient("RADIO"), Some(ItemType::RadioGroup));
        assert_eq!(ItemType::parse_lenient("checkboxes"), Some(ItemType::Checkbox));
        assert_eq!(ItemType::parse_lenient("select"), Some(ItemType::Dropdown));
        assert_eq!(ItemType::parse_lenient("combobox"), Some(ItemType::Dropdown));
        assert_eq!(ItemType::parse_lenient("note"), Some(ItemType::Comment));
        assert_eq!(ItemType::parse_lenient("info"), Some(ItemType::Comment));
        assert_eq!(ItemType::parse_lenient("text_box"), Some(ItemType::Text));
        assert_eq!(ItemType::parse_lenient("matrix"), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for item_type in ItemType::iter() {
            assert_eq!(ItemType::parse_lenient(&item_type.to_string()), Some(item_type));
        }
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(ItemType::parse_or("???", ItemType::AI_DEFAULT), ItemType::Checkbox);
        assert_eq!(ItemType::parse_or("", ItemType::RULE_DEFAULT), ItemType::Text);
    }

    #[test]
    fn test_from_json_ordinal() {
        assert_eq!(
            ItemType::from_json(&serde_json::json!(1), ItemType::Checkbox),
            ItemType::Boolean
        );
        assert_eq!(
            ItemType::from_json(&serde_json::json!(42), ItemType::Checkbox),
            ItemType::Checkbox
        );
        assert_eq!(
            ItemType::from_json(&serde_json::json!(null), ItemType::Comment),
            ItemType::Comment
        );
    }

    #[test]
    fn test_item_serialization_is_camel_case() {
        let item = ChecklistItem::new("item_001", "Confirm scope", ItemType::Checkbox)
            .with_required(true);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["isRequired"], true);
        assert_eq!(json["type"], "Checkbox");
        assert!(json.get("description").is_none());
        assert_eq!(json["options"], serde_json::json!([]));
    }

    #[test]
    fn test_item_deserialization_is_lenient() {
        let item: ChecklistItem = serde_json::from_str(
            r#"{"id":"a","text":"b","type":"yes/no","options":null}"#,
        )
        .unwrap();
        assert_eq!(item.item_type, ItemType::Boolean);
        assert!(item.options.is_empty());
        assert!(!item.is_required);
    }

    #[test]
    fn test_placeholder_and_issue_detection() {
        let item = ChecklistItem::placeholder("processing_error", "Oops", "details");
        assert_eq!(item.item_type, ItemType::Comment);
        assert_eq!(item.description.as_deref(), Some("details"));
        assert!(item.is_issue());
        assert!(!ChecklistItem::new("item_001", "x", ItemType::Text).is_issue());
    }
}
