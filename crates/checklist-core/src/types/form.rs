//! Survey form definition types.
//!
//! The layout mirrors the JSON consumed by SurveyJS-style form renderers:
//! a schema holds either a flat element list or a list of pages.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::error::ChecklistResult;

/// Renderer element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementType {
    Text,
    Radiogroup,
    Checkbox,
    Dropdown,
    Comment,
}

/// A selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }

    /// The default choice pair for yes/no questions.
    pub fn yes_no() -> Vec<Choice> {
        vec![Choice::new("yes", "Yes"), Choice::new("no", "No")]
    }
}

/// One rendered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl FormElement {
    pub fn new(element_type: ElementType, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            element_type,
            name: name.into(),
            title: title.into(),
            description: None,
            is_required: false,
            choices: None,
            input_type: None,
            placeholder: None,
            max_length: None,
        }
    }
}

/// A page of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormPage {
    pub name: String,
    pub title: String,
    pub elements: Vec<FormElement>,
}

/// Renderer display settings plus pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSettings {
    /// Maximum elements per page. Schemas at or under this size are flat.
    #[serde(skip_serializing)]
    pub page_size: usize,
    pub show_progress_bar: String,
    pub complete_text: String,
    pub show_question_numbers: String,
    pub question_title_location: String,
    pub show_navigation_buttons: bool,
    pub go_next_page_automatic: bool,
    pub show_completed_page: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            show_progress_bar: "top".to_string(),
            complete_text: "Complete".to_string(),
            show_question_numbers: "on".to_string(),
            question_title_location: "top".to_string(),
            show_navigation_buttons: true,
            go_next_page_automatic: false,
            show_completed_page: true,
        }
    }
}

/// A complete form definition.
///
/// Exactly one of `elements` and `pages` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<FormElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<FormPage>>,
    #[serde(flatten)]
    pub settings: FormSettings,
}

impl FormSchema {
    /// Every element, in order, whether the schema is flat or paged.
    pub fn all_elements(&self) -> Vec<&FormElement> {
        match (&self.elements, &self.pages) {
            (Some(elements), _) => elements.iter().collect(),
            (None, Some(pages)) => pages.iter().flat_map(|p| p.elements.iter()).collect(),
            (None, None) => Vec::new(),
        }
    }

    /// Number of elements across the whole schema.
    pub fn element_count(&self) -> usize {
        self.all_elements().len()
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> ChecklistResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_serialization_omits_absent_fields() {
        let element = FormElement::new(ElementType::Radiogroup, "q_1", "Is it open?");
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "radiogroup");
        assert_eq!(json["isRequired"], false);
        assert!(json.get("choices").is_none());
        assert!(json.get("inputType").is_none());
    }

    #[test]
    fn test_schema_flattens_settings() {
        let schema = FormSchema {
            title: "T".into(),
            description: "D".into(),
            elements: Some(vec![]),
            pages: None,
            settings: FormSettings::default(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&schema.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["showProgressBar"], "top");
        assert_eq!(json["completeText"], "Complete");
        assert_eq!(json["goNextPageAutomatic"], false);
        assert!(json.get("pages").is_none());
        assert!(json.get("pageSize").is_none());
    }
}
