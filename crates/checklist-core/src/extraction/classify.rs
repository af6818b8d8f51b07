//! Item type classification.
//!
//! Three classifiers cover the three source shapes: [`classify_line`] for
//! prose lines, [`classify_table_hint`] for an answer-hint column and
//! [`classify_question`] for spreadsheet cells. All of them are first-match-wins.

use once_cell::sync::Lazy;
use regex::Regex;

use super::cleanup::lowercase_first;
use crate::types::ItemType;

static LINE_BOOLEAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(yes/no|true/false|confirm|verified?|approved?)\b").unwrap());

static LINE_DROPDOWN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(select|choose|pick|option|type|category)\b.*\b(from|one of|between)\b")
        .unwrap()
});

static LINE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(name|address|phone|email|date|amount|number|describe|explain|provide|enter|specify)\b",
    )
    .unwrap()
});

static LINE_CHECKBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(must|shall|required|mandatory|ensure|verify|confirm|check|comply|attest)\b")
        .unwrap()
});

static REQUIRED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(required|mandatory|must|shall|essential|compulsory)\b").unwrap()
});

static YES_NO_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\(?(yes/no|true/false)\)?").unwrap());

static ACTIONABLE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(check|confirm|verify|ensure|i|we)\b").unwrap());

static HINT_SUB_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]\)|\d\)").unwrap());

static WH_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(what|how|when|where|why|which|who)\b").unwrap());

static AUX_PRONOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(do|are|have|will|can|should|would|could|is|was|does|has)\s+(you|they|we|it)\b")
        .unwrap()
});

static AUX_YOU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(do|are|have|will|can|should|would|could|is|was)\s+you\b").unwrap()
});

static INSTRUCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(check|mark|tick|select|choose|circle|highlight)\s+(all|any|one|the)\b").unwrap()
});

static FIELD_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(name|address|email|phone|date|number|amount|quantity|title|position|role)\b")
        .unwrap()
});

static IMPERATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(complete|fill|answer|respond|rate|evaluate|assess|review)\b").unwrap()
});

static GENERATED_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(column_|row_|cell_)").unwrap());

static NUMBERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+[\)\.]").unwrap());

static LETTERED_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-zA-Z][\)\.]").unwrap());

static WORD_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bor\b").unwrap());

static CHOOSE_MANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(choose|select)\s+(all|multiple|any)").unwrap());

static CHOOSE_FROM_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(select|choose)\s+from\s+(the\s+)?(list|menu|options)").unwrap());

static NUMBERED_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]\)\s*\w+").unwrap());

static NUMBERED_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]\)").unwrap());

static LETTERED_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]\)\s*\w+").unwrap());

static LETTERED_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]\)").unwrap());

static OR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+\s+or\s+\w+").unwrap());

static STANDALONE_NUMBERING: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d+\.?$").unwrap(),
        Regex::new(r"^\d+(\.\d+){1,3}$").unwrap(),
        Regex::new(r"^[a-zA-Z][\)\.]$").unwrap(),
        Regex::new(r"^\([a-zA-Z]\)$").unwrap(),
        Regex::new(r"^\(\d+\)$").unwrap(),
        Regex::new(r"(?i)^[ivxlcdm]+\.$").unwrap(),
    ]
});

static SHORT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}$").unwrap());

static SHORT_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{1,5}$").unwrap());

const QUESTION_KEYWORDS: &[&str] = &[
    "what", "how", "when", "where", "why", "which", "who", "do you", "are you", "have you",
    "will you", "can you", "please", "select", "choose", "enter", "provide", "specify",
    "indicate", "describe", "explain", "list", "name", "identify", "check", "mark", "tick",
    "circle", "rate", "evaluate", "complete", "fill", "answer", "respond", "yes/no",
    "true/false",
];

const QUESTION_PHRASES: &[&str] = &[
    "please ", "select ", "choose ", "enter ", "provide ", "specify ", "indicate ",
    "describe ", "explain ", "list ", "name ", "identify ",
];

const NON_QUESTION_PREFIXES: &[&str] = &[
    "page", "table", "figure", "section", "chapter", "header", "footer", "title", "subtitle",
    "reference", "note", "copyright", "version", "date", "author", "document",
];

const TEXT_WORDS: &[&str] = &[
    "name", "address", "description", "details", "explain", "describe", "list", "specify",
    "provide", "enter", "number", "amount", "quantity", "date", "time", "email", "phone",
    "website",
];

const BULLET_CHARS: &[char] = &['•', '-', '*', '○', '●'];

/// Classify a prose line.
pub fn classify_line(text: &str) -> ItemType {
    let text = text.trim();
    if text.ends_with('?') {
        ItemType::Comment
    } else if LINE_BOOLEAN.is_match(text) {
        ItemType::Boolean
    } else if LINE_DROPDOWN.is_match(text)
        || text.contains('|')
        || text.matches('/').count() > 1
    {
        ItemType::Dropdown
    } else if LINE_TEXT.is_match(text) {
        ItemType::Text
    } else if LINE_CHECKBOX.is_match(text) {
        ItemType::Checkbox
    } else {
        ItemType::Comment
    }
}

/// Whether the text marks the item as mandatory.
pub fn is_required(text: &str) -> bool {
    text.contains('*') || REQUIRED.is_match(text)
}

/// Phrase a prose line as a form label for its type.
pub fn format_label(text: &str, item_type: ItemType) -> String {
    let text = text.trim();
    match item_type {
        ItemType::Boolean => {
            let stripped = YES_NO_SUFFIX.replace_all(text, "").trim().to_string();
            if stripped.is_empty() {
                text.to_string()
            } else {
                stripped
            }
        }
        ItemType::Text => {
            if text.ends_with('?') || text.ends_with(':') {
                text.to_string()
            } else {
                format!("{}:", text.trim_end_matches(['.', ',']))
            }
        }
        ItemType::Checkbox => {
            if ACTIONABLE_START.is_match(text) {
                text.to_string()
            } else {
                format!("Confirm: {}", lowercase_first(text))
            }
        }
        _ => text.to_string(),
    }
}

/// Classify a table row from its answer-hint column.
pub fn classify_table_hint(hint: &str) -> ItemType {
    let lower = hint.to_lowercase();
    if lower.contains("yes/no") || lower.contains("yes / no") {
        ItemType::Boolean
    } else if hint.contains('☐') || lower.contains("checkbox") {
        ItemType::Checkbox
    } else if lower.contains("select") || lower.contains("choose") {
        ItemType::Dropdown
    } else if HINT_SUB_OPTION.is_match(hint) {
        ItemType::RadioGroup
    } else {
        ItemType::RULE_DEFAULT
    }
}

/// Classify a spreadsheet cell that was accepted as a question.
pub fn classify_question(text: &str) -> ItemType {
    let text = text.trim();
    let lower = text.to_lowercase();

    if lower.contains("comment") || lower.contains("notes") || lower.contains("remarks") {
        return ItemType::Comment;
    }

    if ["select all", "check all", "multiple", "mark all", "tick all"]
        .iter()
        .any(|p| lower.contains(p))
        || CHOOSE_MANY.is_match(&lower)
    {
        return ItemType::Checkbox;
    }

    if ["dropdown", "select from list", "choose from", "pick from"]
        .iter()
        .any(|p| lower.contains(p))
        || CHOOSE_FROM_LIST.is_match(&lower)
    {
        return ItemType::Dropdown;
    }

    let numbered =
        NUMBERED_OPTION.is_match(text) && NUMBERED_PAREN.find_iter(text).count() > 1;
    let lettered =
        LETTERED_OPTION.is_match(text) && LETTERED_PAREN.find_iter(text).count() > 1;
    let bullets = text.matches('•').count() > 1 || text.matches('-').count() > 1;
    let or_pattern = OR_PATTERN.is_match(&lower) && !lower.contains("yes or no");
    if numbered || lettered || bullets || or_pattern {
        return ItemType::RadioGroup;
    }

    const AUX_STARTS: &[&str] = &["do ", "are ", "have ", "will ", "can ", "is ", "does ", "has "];
    if ["yes/no", "yes or no", "true/false", "true or false"]
        .iter()
        .any(|p| lower.contains(p))
        || AUX_YOU.is_match(&lower)
        || (text.ends_with('?') && AUX_STARTS.iter().any(|s| lower.starts_with(s)))
    {
        return ItemType::Boolean;
    }

    const WH_STARTS: &[&str] = &["what", "where", "when", "how", "why", "which"];
    if TEXT_WORDS.iter().any(|w| lower.contains(w)) || WH_STARTS.iter().any(|w| lower.starts_with(w))
    {
        return ItemType::Text;
    }

    ItemType::Boolean
}

/// Whether a cell holds only a list marker such as `1.1`, `a)` or `IV.`.
pub fn is_standalone_numbering(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text.chars().count() <= 20
        && STANDALONE_NUMBERING.iter().any(|re| re.is_match(text))
}

/// Whether a spreadsheet cell reads like a question or instruction.
pub fn looks_like_question(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < 5 {
        return false;
    }
    let lower = text.to_lowercase();

    if is_standalone_numbering(text)
        || ["page ", "table ", "figure ", "section ", "chapter "]
            .iter()
            .any(|p| lower.starts_with(p))
        || GENERATED_PREFIX.is_match(&lower)
    {
        return false;
    }

    if text.ends_with('?')
        || lower.contains("yes/no")
        || lower.contains("true/false")
        || WH_WORD.is_match(&lower)
        || AUX_PRONOUN.is_match(&lower)
        || QUESTION_PHRASES.iter().any(|p| lower.contains(p))
    {
        return true;
    }

    if INSTRUCTION.is_match(&lower) {
        return true;
    }

    if FIELD_WORD.is_match(&lower)
        && (text.contains(':')
            || text.contains('_')
            || lower.contains("enter")
            || lower.contains("provide"))
    {
        return true;
    }

    if has_multiple_options(text) {
        return true;
    }

    text.chars().count() > 10 && IMPERATIVE.is_match(&lower)
}

/// Whether the text enumerates more than one answer option.
pub fn has_multiple_options(text: &str) -> bool {
    NUMBERED_MARKER.find_iter(text).count() > 1
        || LETTERED_MARKER.find_iter(text).count() > 1
        || text.chars().filter(|c| BULLET_CHARS.contains(c)).count() > 1
        || (WORD_OR.is_match(text) && !text.to_lowercase().contains("yes or no"))
}

/// Whether the text contains any question keyword.
pub fn contains_question_keywords(text: &str) -> bool {
    let lower = text.to_lowercase();
    QUESTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Headers, footers, labels and bare numbers.
pub fn is_obvious_non_question(text: &str) -> bool {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    NON_QUESTION_PREFIXES.iter().any(|p| lower.starts_with(p))
        || SHORT_NUMBER.is_match(trimmed)
        || SHORT_CAPS.is_match(trimmed)
}
