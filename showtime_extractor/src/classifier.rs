use crate::config::{compile, ConfigError, ExtractorConfig};
use crate::raw_text::{char_len, contains_url, is_all_digits, is_select_prompt};
use crate::time_extractor::TimeExtractor;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    static ref SCREEN_FORMAT: Regex = RegexBuilder::new(r"\d+\s*(mm|k)\s*(dolby|atmos|laser)")
        .case_insensitive(true)
        .build()
        .expect("SCREEN_FORMAT regex to compile");
    static ref WORD_COLON: Regex = Regex::new(r"\w+:\s").expect("WORD_COLON regex to compile");
    static ref DASH_SEPARATOR: Regex =
        Regex::new(r"\s[-–—]\s|[–—]").expect("DASH_SEPARATOR regex to compile");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Length,
    Url,
    SelectPrompt,
    DigitsOnly,
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionSignal {
    Keyword,
    ScreenFormat,
    ColonPattern,
    Separator,
    Locality,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    Rejected(Rejection),
    Accepted(InclusionSignal),
    NoSignal,
}

/// Wide-recall filter deciding whether a single line could name a venue.
///
/// False positives are cheap: a line without any nearby showtime never becomes a record.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    min_line_len: usize,
    max_line_len: usize,
    keywords: Vec<String>,
    localities: Vec<String>,
    exclusions: Vec<Regex>,
    locality_colon: Option<Regex>,
    times: TimeExtractor,
}

impl LineClassifier {
    pub fn new(config: &ExtractorConfig, times: TimeExtractor) -> Result<Self, ConfigError> {
        let exclusions = config
            .exclusions
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let localities = config.lowercased_localities();
        let locality_colon = if localities.is_empty() {
            None
        } else {
            let alternatives = localities
                .iter()
                .map(|locality| regex::escape(locality))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&format!(r"(?i):\s*(?:{alternatives})\b"))?)
        };

        Ok(Self {
            min_line_len: config.min_line_len,
            max_line_len: config.max_line_len,
            keywords: config.lowercased_keywords(),
            localities,
            exclusions,
            locality_colon,
            times,
        })
    }

    pub fn is_venue_line(&self, line: &str) -> bool {
        matches!(self.classify(line), LineVerdict::Accepted(_))
    }

    pub fn classify(&self, line: &str) -> LineVerdict {
        if let Some(rejection) = self.rejection(line) {
            return LineVerdict::Rejected(rejection);
        }
        self.inclusion_signal(line)
            .map(LineVerdict::Accepted)
            .unwrap_or(LineVerdict::NoSignal)
    }

    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclusions.iter().any(|pattern| pattern.is_match(line))
    }

    pub fn contains_keyword(&self, line: &str) -> bool {
        let lowercased = line.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| lowercased.contains(keyword.as_str()))
    }

    pub fn contains_locality(&self, line: &str) -> bool {
        let lowercased = line.to_lowercase();
        self.localities
            .iter()
            .any(|locality| lowercased.contains(locality.as_str()))
    }

    fn rejection(&self, line: &str) -> Option<Rejection> {
        let len = char_len(line);
        if len <= self.min_line_len || len >= self.max_line_len {
            return Some(Rejection::Length);
        }
        if contains_url(line) {
            return Some(Rejection::Url);
        }
        if is_select_prompt(line) {
            return Some(Rejection::SelectPrompt);
        }
        if is_all_digits(line) {
            return Some(Rejection::DigitsOnly);
        }
        if self.is_excluded(line) {
            return Some(Rejection::Excluded);
        }
        None
    }

    fn inclusion_signal(&self, line: &str) -> Option<InclusionSignal> {
        if self.contains_keyword(line) {
            return Some(InclusionSignal::Keyword);
        }
        if SCREEN_FORMAT.is_match(line) {
            return Some(InclusionSignal::ScreenFormat);
        }
        let locality_after_colon = self
            .locality_colon
            .as_ref()
            .map_or(false, |pattern| pattern.is_match(line));
        if WORD_COLON.is_match(line) || locality_after_colon {
            return Some(InclusionSignal::ColonPattern);
        }
        if line.contains(':') || line.contains(',') || DASH_SEPARATOR.is_match(line) {
            return Some(InclusionSignal::Separator);
        }
        if self.contains_locality(line) {
            return Some(InclusionSignal::Locality);
        }
        if self.times.has_time(line) {
            return Some(InclusionSignal::Time);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::classifier::{InclusionSignal, LineClassifier, LineVerdict, Rejection};
    use crate::config::ExtractorConfig;
    use crate::time_extractor::TimeExtractor;
    use rstest::rstest;

    fn classifier_with(config: ExtractorConfig) -> LineClassifier {
        let times = TimeExtractor::new(&config).expect("time pattern to compile");
        LineClassifier::new(&config, times).expect("classifier to build")
    }

    fn classifier() -> LineClassifier {
        classifier_with(ExtractorConfig::default())
    }

    #[rstest]
    #[case("PVR Cinemas Kukatpally", LineVerdict::Accepted(InclusionSignal::Keyword))]
    #[case("Hall 4K Atmos", LineVerdict::Accepted(InclusionSignal::ScreenFormat))]
    #[case("Venue: Madhapur", LineVerdict::Accepted(InclusionSignal::ColonPattern))]
    #[case("Venue Name, Somewhere", LineVerdict::Accepted(InclusionSignal::Separator))]
    #[case("Sri Venkateswara - Screen Two", LineVerdict::Accepted(InclusionSignal::Keyword))]
    #[case("Sri Venkateswara - Hall Two", LineVerdict::Accepted(InclusionSignal::Separator))]
    #[case("Sri Ramulu Talkies Uppal", LineVerdict::Accepted(InclusionSignal::Locality))]
    #[case("Talkies 10:30 AM", LineVerdict::Accepted(InclusionSignal::Separator))]
    #[case("Selectcity Walk, Saket", LineVerdict::Accepted(InclusionSignal::Separator))]
    #[case("Some other text", LineVerdict::NoSignal)]
    fn accepts_lines_with_an_inclusion_signal(#[case] line: &str, #[case] expected: LineVerdict) {
        assert_eq!(classifier().classify(line), expected)
    }

    #[rstest]
    #[case("PVR", Rejection::Length)]
    #[case("12345", Rejection::Length)]
    #[case("1234567890", Rejection::DigitsOnly)]
    #[case("http://example.com booking link", Rejection::Url)]
    #[case("Select a cinema near Kukatpally", Rejection::SelectPrompt)]
    #[case("Movies in Hyderabad, PVR Cinemas", Rejection::Excluded)]
    #[case("INOX", Rejection::Length)]
    #[case("Cinepolis", Rejection::Excluded)]
    #[case("Part 2", Rejection::Excluded)]
    #[case("Part - 2: The Return", Rejection::Excluded)]
    #[case("10:00 AM, 2:30 PM", Rejection::Excluded)]
    #[case("Book tickets at AMB Cinemas", Rejection::Excluded)]
    fn rejects_lines(#[case] line: &str, #[case] expected: Rejection) {
        assert_eq!(classifier().classify(line), LineVerdict::Rejected(expected))
    }

    #[test]
    fn exclusion_wins_over_keywords() {
        let classifier = classifier();
        let line = "Movies in Hyderabad at PVR Cinemas, INOX";

        assert!(classifier.contains_keyword(line));
        assert!(!classifier.is_venue_line(line));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let classifier = classifier();
        let long_name = format!("PVR {}", "x".repeat(195));
        assert_eq!(long_name.chars().count(), 199);
        assert!(classifier.is_venue_line(&long_name));
        assert!(!classifier.is_venue_line(&format!("{long_name}x")));
    }

    #[test]
    fn time_token_is_the_last_resort_signal() {
        let config = ExtractorConfig {
            time_pattern: r"(?i)\b\d{1,2}\.\d{2} ?[ap]m\b".to_string(),
            ..Default::default()
        };
        assert_eq!(
            classifier_with(config).classify("Talkies 10.30 AM"),
            LineVerdict::Accepted(InclusionSignal::Time)
        )
    }

    #[test]
    fn tables_are_swappable() {
        let config = ExtractorConfig {
            keywords: vec!["kino".to_string()],
            localities: vec![],
            exclusions: vec![r"(?i)^kino\s+club".to_string()],
            ..Default::default()
        };
        let classifier = classifier_with(config);

        assert!(classifier.is_venue_line("Kino International"));
        assert!(!classifier.is_venue_line("Kino Club Members"));
        assert!(!classifier.is_venue_line("PVR Cinemas Kukatpally"));
    }
}
