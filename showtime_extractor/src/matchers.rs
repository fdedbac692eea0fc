use crate::config::{compile, ConfigError, ExtractorConfig};
use crate::raw_text::{char_len, has_letter, trim_trailing_separators};
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Debug;

/// Where a venue label stops: a delimiter, a clock time or the end of the line.
const TERMINATOR: &str = r"\s*(?:[:|(–—]|-\s|\d{1,2}:\d{2}|$)";

lazy_static! {
    static ref SEPARATED_TIME: Regex =
        Regex::new(r"^(\p{L}[^:|]{2,80}?)\s*(?::|\s[-–—]|[.(])\s*\(?\d{1,2}[:.]\d{2}")
            .expect("SEPARATED_TIME regex to compile");
}

/// A structural "Name: times" shape tried against a single line.
pub trait PrefixMatcher: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// The venue label captured from the start of the line, if this shape matches.
    fn try_match(&self, line: &str) -> Option<String>;
}

fn accept_capture(capture: &str) -> Option<String> {
    let label = trim_trailing_separators(capture);
    if char_len(label) < 3 || !has_letter(label) {
        return None;
    }
    Some(label.to_string())
}

fn alternation(values: &[String]) -> String {
    values
        .iter()
        .sorted_by_key(|value| std::cmp::Reverse(value.len()))
        .map(|value| regex::escape(value))
        .join("|")
}

fn anchored_on(values: &[String]) -> Result<Regex, ConfigError> {
    compile(&format!(
        r"(?i)^([^:|]*?\b(?:{})\b[^:|(]*?){TERMINATOR}",
        alternation(values)
    ))
}

fn capture_first_group(pattern: &Regex, line: &str) -> Option<String> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .and_then(|group| accept_capture(group.as_str()))
}

/// Venues named explicitly in the configuration, eg: "Sudarshan 35mm".
#[derive(Debug)]
pub struct NamedVenueMatcher {
    pattern: Regex,
}

impl PrefixMatcher for NamedVenueMatcher {
    fn name(&self) -> &'static str {
        "named_venue"
    }

    fn try_match(&self, line: &str) -> Option<String> {
        capture_first_group(&self.pattern, line)
    }
}

/// Labels containing a chain name or format tag, eg: "PVR Cinema: 10:00 AM".
#[derive(Debug)]
pub struct KeywordMatcher {
    pattern: Regex,
}

impl PrefixMatcher for KeywordMatcher {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn try_match(&self, line: &str) -> Option<String> {
        capture_first_group(&self.pattern, line)
    }
}

/// "Name, Locality" or "Name: Locality", the label being the part before the locality.
#[derive(Debug)]
pub struct LocalityMatcher {
    pattern: Regex,
}

impl PrefixMatcher for LocalityMatcher {
    fn name(&self) -> &'static str {
        "locality"
    }

    fn try_match(&self, line: &str) -> Option<String> {
        capture_first_group(&self.pattern, line)
    }
}

/// Any label followed by a colon, dash, dot or parenthesis and then a clock time.
#[derive(Debug)]
pub struct SeparatorMatcher;

impl PrefixMatcher for SeparatorMatcher {
    fn name(&self) -> &'static str {
        "separator"
    }

    fn try_match(&self, line: &str) -> Option<String> {
        capture_first_group(&SEPARATED_TIME, line)
    }
}

/// The matchers in precedence order: specific venues first, then keywords, localities and
/// finally the bare separator shape. A matcher whose table is empty is left out.
pub fn build_matchers(
    config: &ExtractorConfig,
) -> Result<Vec<Box<dyn PrefixMatcher>>, ConfigError> {
    let mut matchers: Vec<Box<dyn PrefixMatcher>> = vec![];

    let named_venues = config.lowercased_named_venues();
    if !named_venues.is_empty() {
        matchers.push(Box::new(NamedVenueMatcher {
            pattern: anchored_on(&named_venues)?,
        }));
    }

    let keywords = config.lowercased_keywords();
    if !keywords.is_empty() {
        matchers.push(Box::new(KeywordMatcher {
            pattern: anchored_on(&keywords)?,
        }));
    }

    let localities = config.lowercased_localities();
    if !localities.is_empty() {
        let pattern = compile(&format!(
            r"(?i)^([^:|,]*?\p{{L}}[^:|,]*?)\s*(?:[:,|]|\s[-–—])\s*(?:{})\b",
            alternation(&localities)
        ))?;
        matchers.push(Box::new(LocalityMatcher { pattern }));
    }

    matchers.push(Box::new(SeparatorMatcher));

    Ok(matchers)
}

/// Runs the matchers top to bottom, returning the first captured label and who captured it.
pub fn first_match(
    matchers: &[Box<dyn PrefixMatcher>],
    line: &str,
) -> Option<(&'static str, String)> {
    matchers
        .iter()
        .find_map(|matcher| matcher.try_match(line).map(|label| (matcher.name(), label)))
}
