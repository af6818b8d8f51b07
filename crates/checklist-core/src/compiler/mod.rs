//! Form schema compilation.
//!
//! [`FormCompiler`] turns checklist items into a renderer-ready [`FormSchema`].
//! Compilation is pure and total: every item becomes exactly one element.

mod hints;
mod naming;
mod text;

pub use hints::{is_descriptive, text_hint, TextHint, COMMENT_PLACEHOLDER, DETAILS_PLACEHOLDER};
pub use naming::{sanitize, NameRegistry};
pub use text::{clean_text, clean_title, UNTITLED};

use tracing::{debug, info};

use crate::extraction::{clean_option_text, is_plausible_option};
use crate::types::{
    ChecklistItem, Choice, ElementType, FormElement, FormPage, FormSchema, FormSettings, ItemType,
};

/// Title used when the caller supplies none.
pub const DEFAULT_TITLE: &str = "Generated Survey";

/// Compiles checklist items into form schemas.
#[derive(Debug, Clone, Default)]
pub struct FormCompiler {
    settings: FormSettings,
}

impl FormCompiler {
    pub fn new(settings: FormSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Compile `items` into a schema titled `title`.
    pub fn compile(&self, items: &[ChecklistItem], title: &str) -> FormSchema {
        let mut names = NameRegistry::new();
        let elements: Vec<FormElement> = items
            .iter()
            .map(|item| compile_element(item, &mut names))
            .collect();

        let title = match title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };
        let description = format!("Generated from {} checklist items", items.len());

        let page_size = self.settings.page_size.max(1);
        let (elements, pages) = if elements.len() <= page_size {
            (Some(elements), None)
        } else {
            (None, Some(paginate(elements, page_size)))
        };

        let schema = FormSchema {
            title,
            description,
            elements,
            pages,
            settings: self.settings.clone(),
        };
        info!(
            title = %schema.title,
            elements = schema.element_count(),
            pages = schema.pages.as_ref().map_or(0, Vec::len),
            "Compiled form schema"
        );
        schema
    }
}

fn paginate(elements: Vec<FormElement>, page_size: usize) -> Vec<FormPage> {
    let mut pages = Vec::with_capacity(elements.len().div_ceil(page_size));
    let mut rest = elements.into_iter().peekable();
    while rest.peek().is_some() {
        let n = pages.len() + 1;
        pages.push(FormPage {
            name: format!("page_{n}"),
            title: format!("Section {n}"),
            elements: rest.by_ref().take(page_size).collect(),
        });
    }
    pages
}

fn compile_element(item: &ChecklistItem, names: &mut NameRegistry) -> FormElement {
    let name = names.claim(&sanitize(&item.id));
    let title = clean_title(&item.text);

    let mut element = match item.item_type {
        ItemType::Text if is_descriptive(&title) => {
            let mut element = FormElement::new(ElementType::Comment, name, title);
            element.placeholder = Some(DETAILS_PLACEHOLDER.to_string());
            element
        }
        ItemType::Text => {
            let mut element = FormElement::new(ElementType::Text, name, title);
            if let Some(hint) = text_hint(&element.title) {
                element.input_type = hint.input_type.map(str::to_string);
                element.placeholder = hint.placeholder.map(str::to_string);
                element.max_length = hint.max_length;
            }
            element
        }
        ItemType::Boolean | ItemType::RadioGroup => {
            let mut element = FormElement::new(ElementType::Radiogroup, name, title);
            element.choices = Some(choices_or_yes_no(&item.options));
            element
        }
        ItemType::Dropdown => {
            let mut element = FormElement::new(ElementType::Dropdown, name, title);
            element.choices = Some(choices_or_yes_no(&item.options));
            element
        }
        ItemType::Checkbox => {
            let mut element = FormElement::new(ElementType::Checkbox, name, title);
            let choices = choices(&item.options);
            element.choices = (!choices.is_empty()).then_some(choices);
            element
        }
        ItemType::Comment => {
            let mut element = FormElement::new(ElementType::Comment, name, title);
            element.placeholder = Some(COMMENT_PLACEHOLDER.to_string());
            element
        }
    };

    element.description = item
        .description
        .as_deref()
        .map(clean_text)
        .filter(|d| !d.is_empty());
    element.is_required = item.is_required;

    debug!(
        id = %item.id,
        name = %element.name,
        element_type = %element.element_type,
        "Compiled element"
    );
    element
}

fn choices(options: &[String]) -> Vec<Choice> {
    let mut values = NameRegistry::new();
    options
        .iter()
        .map(|o| clean_option_text(o))
        .filter(|o| is_plausible_option(o))
        .map(|text| Choice::new(values.claim(&sanitize(&text)), text))
        .collect()
}

fn choices_or_yes_no(options: &[String]) -> Vec<Choice> {
    let choices = choices(options);
    if choices.is_empty() {
        Choice::yes_no()
    } else {
        choices
    }
}
