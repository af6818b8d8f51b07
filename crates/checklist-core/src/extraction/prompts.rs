//! Prompt templates for AI-assisted extraction.

use crate::types::ItemType;
use strum::IntoEnumIterator;

/// Appended when a document is cut to the content ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated for processing]";

/// Cut `content` to at most `ceiling` chars, marking the cut.
pub fn truncate_content(content: &str, ceiling: usize) -> String {
    match content.char_indices().nth(ceiling) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// System prompt for checklist extraction.
pub fn extraction_system_prompt() -> &'static str {
    r#"You are an expert document analyst specializing in creating comprehensive compliance checklists.
Your task is to analyze documents and extract actionable items, requirements, and compliance points.

For each checklist item, determine the most appropriate type:
- 'Checkbox' for actionable items, requirements, or verification tasks
- 'Text' for items requiring user input (names, dates, amounts, descriptions)
- 'Dropdown' for items with multiple choice options
- 'RadioGroup' for picking exactly one of a few listed options
- 'Boolean' for simple yes/no questions
- 'Comment' for informational content or explanations

Focus on quality over quantity. Extract the most important and actionable items.
Ensure each item is clear, specific, and actionable."#
}

/// User prompt carrying the document.
pub fn extraction_user_prompt(file_name: &str, content: &str, max_items: usize) -> String {
    let types = ItemType::iter()
        .map(|t| format!(r#""{t}""#))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Analyze this document and create a structured checklist. Extract actionable items, requirements, and compliance points.

Document filename: {file_name}

Document content:
{content}

Return ONLY a JSON array of objects with this exact structure. Limit it to at most {max_items} items so the response fits within API limits:
[
  {{
    "id": "unique_identifier_1",
    "text": "Clear, actionable checklist item text",
    "description": "Additional context or explanation",
    "type": "Checkbox",
    "isRequired": true,
    "options": []
  }}
]

Rules:
1. "type" MUST be exactly one of: {types}
2. "isRequired" MUST be true or false (boolean, not string)
3. "options" MUST be an array (use [] if empty, and for yes/no items)
4. "id" should be unique and descriptive (use underscores, no spaces)
5. Preserve important regulatory or compliance requirements
6. Use 'Comment' only for section headers or explanatory text
7. Ensure each item is independently actionable

Return ONLY the JSON array. No markdown formatting, no explanations, no additional text."#
    )
}

/// Prompt asking the model to improve an existing checklist.
pub fn enhance_prompt(checklist_json: &str) -> String {
    format!(
        r#"Enhance this existing checklist by improving clarity, adding missing steps, and ensuring completeness.

Current checklist:
{checklist_json}

Please:
1. Review each item for clarity and actionability
2. Identify any logical gaps or missing steps
3. Improve wording to be more specific and measurable
4. Maintain the same JSON structure
5. Preserve all existing item IDs
6. Add new items with unique IDs if needed

Return the enhanced checklist as a JSON array with the same structure as the input.
Return only the JSON array, no additional text or formatting."#
    )
}
