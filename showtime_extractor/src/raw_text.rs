use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL: Regex =
        Regex::new(r"(?i)(?:https?://|www\.)").expect("URL regex to compile");
    static ref SELECT_PROMPT: Regex =
        Regex::new(r"\bSelect\b").expect("SELECT_PROMPT regex to compile");
}

/// The page text as an ordered list of trimmed, non-empty lines.
///
/// Line order is the only positional signal left after rendering, so it is preserved as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .lines()
            .flat_map(|line| line.split('\r'))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub(crate) fn contains_url(line: &str) -> bool {
    URL.is_match(line)
}

/// Booking widgets ("Select showtime", "Select a cinema") carry the word `Select`.
pub(crate) fn is_select_prompt(line: &str) -> bool {
    SELECT_PROMPT.is_match(line)
}

pub(crate) fn is_all_digits(line: &str) -> bool {
    let mut chars = line.chars().filter(|c| !c.is_whitespace()).peekable();
    chars.peek().is_some() && chars.all(|c| c.is_ascii_digit())
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Drops separator punctuation hanging off the end of a label, eg: "PVR Cinema -" -> "PVR Cinema"
pub(crate) fn trim_trailing_separators(value: &str) -> &str {
    value.trim_end_matches(is_separator).trim_start()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '-' | '–' | '—' | '|' | ',' | '.' | '(' | '@')
}

/// Strips leading non-letters and trailing punctuation, eg: "• 1. AMB Cinemas: " -> "AMB Cinemas"
pub(crate) fn clean_label(value: &str) -> &str {
    value
        .trim_start_matches(|c: char| !c.is_alphabetic())
        .trim_end_matches(|c: char| {
            c.is_whitespace()
                || (c.is_ascii_punctuation() && c != ')')
                || matches!(c, '–' | '—' | '•')
        })
}

pub(crate) fn has_letter(value: &str) -> bool {
    value.chars().any(char::is_alphabetic)
}
