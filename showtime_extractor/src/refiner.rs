use crate::config::ExtractorConfig;
use crate::raw_text::{char_len, contains_url, is_all_digits, trim_trailing_separators};
use crate::time_extractor::TimeExtractor;

/// Swaps a matched label for a fuller one found on a neighbouring line.
///
/// Listings often print "AMB Cinemas" on one row and "AMB Cinemas: Gachibowli, Hyderabad" on
/// the next; the longer row is the better label.
#[derive(Debug, Clone)]
pub struct NameRefiner {
    radius: usize,
    max_refined_len: usize,
    times: TimeExtractor,
}

impl NameRefiner {
    pub fn new(config: &ExtractorConfig, times: TimeExtractor) -> Self {
        Self {
            radius: config.refine_radius,
            max_refined_len: config.max_refined_len,
            times,
        }
    }

    pub fn refine(&self, lines: &[String], index: usize, raw_name: &str) -> String {
        let start = index.saturating_sub(self.radius);
        let end = index.saturating_add(self.radius).saturating_add(1).min(lines.len());
        if start >= end {
            return raw_name.to_string();
        }

        let raw_lowercased = raw_name.to_lowercase();
        let raw_len = char_len(raw_name);

        lines[start..end]
            .iter()
            .filter(|line| !contains_url(line) && (line.contains(':') || line.contains(',')))
            .map(|line| self.label(line))
            .find(|label| {
                let label_len = char_len(label);
                let label_lowercased = label.to_lowercase();
                label_len > raw_len
                    && label_len < self.max_refined_len
                    && !is_all_digits(label)
                    && label_lowercased.contains(&raw_lowercased)
            })
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| raw_name.to_string())
    }

    /// The part of a line that can name something: everything before its first showtime.
    fn label<'a>(&self, line: &'a str) -> &'a str {
        match self.times.first_time_offset(line) {
            Some(offset) => trim_trailing_separators(&line[..offset]),
            None => line.trim(),
        }
    }
}
