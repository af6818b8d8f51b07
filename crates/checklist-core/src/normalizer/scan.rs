//! String-aware bracket scanning.
//!
//! All positions are byte offsets. Brackets and quotes are ASCII, so every
//! offset produced here is a valid char boundary for slicing.

/// A balanced `[...]` or `{...}` region, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

fn matching_opener(closer: u8) -> u8 {
    if closer == b']' {
        b'['
    } else {
        b'{'
    }
}

pub(crate) fn closer_for(opener: u8) -> char {
    if opener == b'[' {
        ']'
    } else {
        '}'
    }
}

/// Tracks whether a byte stream is inside a JSON string literal.
#[derive(Default)]
struct StringState {
    in_string: bool,
    escaped: bool,
}

impl StringState {
    /// Feed one byte. Returns true when the byte is part of a string literal
    /// (including its closing quote).
    fn consume(&mut self, b: u8) -> bool {
        if !self.in_string {
            return false;
        }
        if self.escaped {
            self.escaped = false;
        } else if b == b'\\' {
            self.escaped = true;
        } else if b == b'"' {
            self.in_string = false;
        }
        true
    }
}

/// Every outermost balanced region, in document order.
///
/// String tracking only starts inside a bracket, so quotes in surrounding
/// prose do not hide structure. A closer that does not match the innermost
/// opener resets the scan.
pub(crate) fn balanced_regions(text: &str) -> Vec<Region> {
    let mut stack: Vec<(u8, usize)> = Vec::new();
    let mut strings = StringState::default();
    let mut regions = Vec::new();

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'"' if !stack.is_empty() => strings.in_string = true,
            b'[' | b'{' => stack.push((b, i)),
            b']' | b'}' => match stack.last() {
                Some(&(opener, start)) if opener == matching_opener(b) => {
                    stack.pop();
                    regions.push(Region { start, end: i + 1 });
                }
                _ => stack.clear(),
            },
            _ => {}
        }
    }

    regions.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut outermost: Vec<Region> = Vec::new();
    for region in regions {
        if outermost.last().map_or(true, |last| region.start >= last.end) {
            outermost.push(region);
        }
    }
    outermost
}

/// End (exclusive) of the balanced region opening at `start`.
pub(crate) fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !matches!(bytes.get(start), Some(b'[' | b'{')) {
        return None;
    }
    let mut stack: Vec<u8> = Vec::new();
    let mut strings = StringState::default();

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'"' => strings.in_string = true,
            b'[' | b'{' => stack.push(b),
            b']' | b'}' => {
                if stack.pop() != Some(matching_opener(b)) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Positions of every `]` or `}` outside string literals.
pub(crate) fn close_positions(text: &str) -> Vec<usize> {
    let mut strings = StringState::default();
    let mut positions = Vec::new();
    for (i, &b) in text.as_bytes().iter().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'"' => strings.in_string = true,
            b']' | b'}' => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Openers left unclosed at the end of `text`, outermost first.
pub(crate) fn unclosed_openers(text: &str) -> Vec<u8> {
    let mut stack = Vec::new();
    let mut strings = StringState::default();
    for &b in text.as_bytes() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'"' => strings.in_string = true,
            b'[' | b'{' => stack.push(b),
            b']' | b'}' => {
                if stack.last() == Some(&matching_opener(b)) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }
    stack
}

/// Remove commas that directly precede a closer, ignoring string contents.
pub(crate) fn strip_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut strings = StringState::default();
    let mut last = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if strings.consume(b) {
            continue;
        }
        match b {
            b'"' => strings.in_string = true,
            b',' => {
                let next = bytes[i + 1..].iter().find(|c| !c.is_ascii_whitespace());
                if matches!(next, Some(b']' | b'}')) {
                    out.push_str(&text[last..i]);
                    last = i + 1;
                }
            }
            _ => {}
        }
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_regions_outermost_only() {
        let text = r#"Here you go: [{"a": [1, 2]}, {"b": "]"}] and also {"x": 1}."#;
        let regions = balanced_regions(text);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].as_str(text), r#"[{"a": [1, 2]}, {"b": "]"}]"#);
        assert_eq!(regions[1].as_str(text), r#"{"x": 1}"#);
    }

    #[test]
    fn test_balanced_regions_skip_stray_opener() {
        let text = r#"He said "look" (see [here) then [1]"#;
        let regions = balanced_regions(text);
        assert_eq!(regions.last().unwrap().as_str(text), "[1]");
    }

    #[test]
    fn test_balanced_end() {
        let text = r#"answer: {"a": "}"} trailing"#;
        let start = text.find('{').unwrap();
        let end = balanced_end(text, start).unwrap();
        assert_eq!(&text[start..end], r#"{"a": "}"}"#);
        assert_eq!(balanced_end("[1, 2", 0), None);
    }

    #[test]
    fn test_unclosed_openers_respects_escapes() {
        assert_eq!(unclosed_openers(r#"[{"a": "x\"]"#), vec![b'[', b'{']);
        assert!(unclosed_openers("[1]").is_empty());
    }

    #[test]
    fn test_strip_trailing_commas() {
        assert_eq!(strip_trailing_commas(r#"[1, 2, ]"#), "[1, 2 ]");
        assert_eq!(strip_trailing_commas(r#"{"a": ",}"}"#), r#"{"a": ",}"}"#);
    }
}
