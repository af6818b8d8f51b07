//! Input hints for free-text elements.

use once_cell::sync::Lazy;
use regex::Regex;

static DESCRIPTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(describe|explain|details?|comments?|justify|elaborate|provide\s+(?:any\s+)?information)\b",
    )
    .unwrap()
});

pub const DETAILS_PLACEHOLDER: &str = "Please provide details...";
pub const COMMENT_PLACEHOLDER: &str = "Enter your response here...";

/// Rendering hints derived from a text question's wording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHint {
    pub input_type: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub max_length: Option<u32>,
}

struct HintRule {
    pattern: &'static str,
    hint: TextHint,
}

const fn rule(
    pattern: &'static str,
    input_type: Option<&'static str>,
    placeholder: Option<&'static str>,
    max_length: Option<u32>,
) -> HintRule {
    HintRule {
        pattern,
        hint: TextHint {
            input_type,
            placeholder,
            max_length,
        },
    }
}

// First match wins.
static RULES: [HintRule; 8] = [
    rule(r"(?i)\be-?mail\b", Some("email"), Some("name@example.com"), None),
    rule(r"(?i)\b(phone|telephone|mobile)\b", Some("tel"), None, Some(20)),
    rule(r"(?i)\b(url|website)\b", Some("url"), None, None),
    rule(r"(?i)\bdate\b", Some("date"), None, None),
    rule(r"(?i)\btime\b", Some("time"), None, None),
    rule(
        r"(?i)\b(number|amount|quantity|percentage)\b",
        Some("number"),
        None,
        None,
    ),
    rule(r"(?i)\bname\b", None, Some("Enter name"), Some(100)),
    rule(r"(?i)\baddress\b", None, Some("Enter address"), Some(250)),
];

static COMPILED: Lazy<Vec<(Regex, &'static TextHint)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|r| (Regex::new(r.pattern).unwrap(), &r.hint))
        .collect()
});

/// Whether the wording asks for a longer free-form answer.
pub fn is_descriptive(text: &str) -> bool {
    DESCRIPTIVE.is_match(text)
}

/// Hint for a text question, if any keyword matches.
pub fn text_hint(text: &str) -> Option<TextHint> {
    COMPILED
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, hint)| (*hint).clone())
}
