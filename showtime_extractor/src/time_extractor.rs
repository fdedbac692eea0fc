use crate::config::{compile, ConfigError, ExtractorConfig};
use crate::raw_text::{char_len, contains_url, is_select_prompt};
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;

/// Finds 12-hour clock times ("10:00 AM", "4:45pm") around a venue line.
///
/// Showtimes usually follow the venue name in rendered listings, so the window looks a
/// couple of lines behind and much further ahead.
#[derive(Debug, Clone)]
pub struct TimeExtractor {
    pattern: Regex,
    backward_margin: usize,
    secondary_forward_range: usize,
    max_showtime_line_len: usize,
}

impl TimeExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile(&config.time_pattern)?,
            backward_margin: config.backward_margin,
            secondary_forward_range: config.secondary_forward_range,
            max_showtime_line_len: config.max_showtime_line_len,
        })
    }

    pub fn tokens<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(line).map(|found| found.as_str())
    }

    pub fn has_time(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Byte offset of the first time token on the line.
    pub fn first_time_offset(&self, line: &str) -> Option<usize> {
        self.pattern.find(line).map(|found| found.start())
    }

    pub fn window(&self, len: usize, center: usize, forward_range: usize) -> Range<usize> {
        let start = center.saturating_sub(self.backward_margin).min(len);
        let end = center.saturating_add(forward_range).min(len);
        start..end.max(start)
    }

    pub fn extract_times(
        &self,
        lines: &[String],
        center: usize,
        forward_range: usize,
    ) -> BTreeSet<String> {
        self.extract_times_in(lines, center, self.window(lines.len(), center, forward_range))
    }

    /// Like [`TimeExtractor::extract_times`], over a window computed up front. The window is
    /// clipped to `lines` again before use.
    pub fn extract_times_in(
        &self,
        lines: &[String],
        center: usize,
        window: Range<usize>,
    ) -> BTreeSet<String> {
        let mut times = BTreeSet::new();

        let end = window.end.min(lines.len());
        let start = window.start.min(end);
        for line in &lines[start..end] {
            times.extend(self.tokens(line).map(ToOwned::to_owned));
        }

        if let Some(line) = lines.get(center) {
            times.extend(self.tokens(line).map(ToOwned::to_owned));
        }

        let secondary = lines
            .iter()
            .skip(center.saturating_add(1))
            .take(self.secondary_forward_range)
            .filter(|line| self.could_be_showtime_line(line));
        for line in secondary {
            times.extend(self.tokens(line).map(ToOwned::to_owned));
        }

        times
    }

    fn could_be_showtime_line(&self, line: &str) -> bool {
        char_len(line) <= self.max_showtime_line_len
            && !contains_url(line)
            && !is_select_prompt(line)
    }
}
