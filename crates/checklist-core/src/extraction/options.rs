//! Answer option extraction and the option sanity filter.
//!
//! Enumerations are split on marker positions: the text between one marker
//! and the next is an option, anything before the first marker is the stem.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::cleanup::capitalize_first;

/// Line-path fallback when a dropdown lists nothing usable.
pub const DEFAULT_DROPDOWN_OPTIONS: [&str; 3] = ["Yes", "No", "Not Applicable"];

const MAX_DROPDOWN_OPTIONS: usize = 10;

static NUMBERED_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)\d+[\)\.]").unwrap());

static LETTERED_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)[a-zA-Z][\)\.]").unwrap());

static BULLET_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•*○●]|(?:^|\s)-(?:\s|$)").unwrap());

static HINT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)\(?[a-zA-Z0-9]\)").unwrap());

static WORD_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+or\s+").unwrap());

static DROPDOWN_LEADS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:select|choose|pick)\s+(?:from|one of|between):\s*(.+)").unwrap(),
        Regex::new(r"(?i)(?:options?|choices?):\s*(.+)").unwrap(),
    ]
});

static DROPDOWN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[,/|]\s*|\s+or\s+").unwrap());

static OPTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\(?[0-9a-zA-Z]\)|[0-9a-zA-Z]\.)\s+").unwrap());

static OPTION_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-*○●]\s*").unwrap());

static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Whether an option reads like a real answer rather than a text fragment.
///
/// Rejects options that are too short or too long, that hold only digits and
/// punctuation, or that start mid-word (lowercase run over 25 chars).
pub fn is_plausible_option(option: &str) -> bool {
    let option = option.trim();
    let len = option.chars().count();
    if !(2..=100).contains(&len) {
        return false;
    }
    if option
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_punctuation() || c.is_whitespace())
    {
        return false;
    }
    let mut chars = option.chars();
    let starts_mid_word = matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_lowercase() && b.is_lowercase()
    );
    !(starts_mid_word && len > 25)
}

/// Strip a leading `a)` / `1.` / bullet marker and trailing punctuation, then
/// capitalize.
pub fn clean_option_text(option: &str) -> String {
    let option = OPTION_MARKER.replace(option.trim(), "");
    let option = OPTION_BULLET.replace(&option, "");
    capitalize_first(option.trim().trim_end_matches(['.', ',', ';', ':', '?']).trim())
}

/// Options for a dropdown line such as `Select one of: A, B or C`.
pub fn dropdown_options(text: &str) -> Vec<String> {
    let listed = DROPDOWN_LEADS
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| {
            DROPDOWN_SEPARATOR
                .split(m.as_str())
                .map(str::trim)
                .filter(|o| o.chars().count() > 1)
                .take(MAX_DROPDOWN_OPTIONS)
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if listed.is_empty() {
        DEFAULT_DROPDOWN_OPTIONS.iter().map(|o| o.to_string()).collect()
    } else {
        listed
    }
}

/// Options listed in a table answer-hint cell, for example `a) UCITS b) AIF`.
pub fn hint_options(hint: &str) -> Vec<String> {
    let mut options = split_on_markers(hint, &HINT_MARK, false);
    if options.is_empty() {
        options = comma_parts(hint);
    }
    if options.is_empty() {
        let lower = hint.to_lowercase();
        if lower.contains("yes") && lower.contains("no") {
            options = vec!["Yes".to_string(), "No".to_string()];
        }
    }
    finish(options)
}

/// Options embedded in a spreadsheet question.
///
/// Strategies run in order and the first that yields anything wins: numbered
/// markers, lettered markers, bullets, an `x or y` alternative, a comma list,
/// and finally yes/no or true/false wording.
pub fn question_options(text: &str) -> Vec<String> {
    let strategies: [fn(&str) -> Vec<String>; 6] = [
        |t| split_on_markers(t, &NUMBERED_MARK, true),
        |t| split_on_markers(t, &LETTERED_MARK, true),
        |t| split_on_markers(t, &BULLET_MARK, false),
        or_options,
        comma_options,
        yes_no_options,
    ];
    let options = strategies
        .iter()
        .map(|strategy| strategy(text))
        .find(|options| !options.is_empty())
        .unwrap_or_default();
    finish(options)
}

fn finish(options: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    options
        .iter()
        .map(|o| clean_option_text(o))
        .filter(|o| is_plausible_option(o))
        .filter(|o| seen.insert(o.to_lowercase()))
        .collect()
}

/// Text between consecutive markers. Needs at least two markers. With
/// `detached`, a marker directly followed by an alphanumeric (`1.1`, `e.g`)
/// does not count.
fn split_on_markers(text: &str, marker: &Regex, detached: bool) -> Vec<String> {
    let marks: Vec<(usize, usize)> = marker
        .find_iter(text)
        .filter(|m| !detached || !text[m.end()..].starts_with(|c: char| c.is_alphanumeric()))
        .map(|m| (m.start(), m.end()))
        .collect();
    if marks.len() < 2 {
        return Vec::new();
    }
    marks
        .iter()
        .enumerate()
        .map(|(i, &(_, end))| {
            let stop = marks.get(i + 1).map_or(text.len(), |&(start, _)| start);
            text[end..stop].trim().to_string()
        })
        .filter(|o| o.chars().count() > 1)
        .collect()
}

fn or_options(text: &str) -> Vec<String> {
    let clause = text.rsplit(':').next().unwrap_or(text);
    let clause = clause.trim().trim_end_matches(['?', '.', '!']);
    let Some(or) = WORD_OR.find_iter(clause).last() else {
        return Vec::new();
    };
    let (left, right) = (clause[..or.start()].trim(), clause[or.end()..].trim());
    if left.is_empty() || right.is_empty() {
        return Vec::new();
    }

    let width = right.split_whitespace().count();
    let mut parts: Vec<&str> = left.split(',').map(str::trim).collect();
    let first = parts[0];
    let starts: Vec<usize> = first
        .char_indices()
        .filter(|&(i, c)| !c.is_whitespace() && (i == 0 || first[..i].ends_with(char::is_whitespace)))
        .map(|(i, _)| i)
        .collect();
    let skip = starts.len().saturating_sub(width);
    if skip > 0 {
        parts[0] = &first[starts[skip]..];
    }
    parts.push(right);
    parts
        .into_iter()
        .filter(|p| p.chars().count() > 1)
        .map(String::from)
        .collect()
}

fn comma_parts(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split(',').filter(|p| !p.trim().is_empty()).collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts.iter().map(|p| p.trim().to_string()).collect()
}

fn comma_options(text: &str) -> Vec<String> {
    let parts = comma_parts(text);
    if !(2..=8).contains(&parts.len()) {
        return Vec::new();
    }
    let valid = parts.iter().all(|p| {
        let cleaned = clean_option_text(p);
        let lower = cleaned.to_lowercase();
        (2..50).contains(&cleaned.chars().count())
            && !lower.contains("question")
            && !lower.contains("answer")
            && !ALL_DIGITS.is_match(&cleaned)
    });
    if valid {
        parts
    } else {
        Vec::new()
    }
}

fn yes_no_options(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let pair = if lower.contains("yes/no") || lower.contains("yes or no") {
        ["Yes", "No"]
    } else if lower.contains("true/false") || lower.contains("true or false") {
        ["True", "False"]
    } else {
        return Vec::new();
    };
    pair.iter().map(|o| o.to_string()).collect()
}
