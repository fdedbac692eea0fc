use crate::classifier::LineClassifier;
use crate::config::ExtractorConfig;
use crate::raw_text::{char_len, clean_label, contains_url, has_letter};
use crate::reconciler::{NormalizedKey, Reconciler, ReconciliationMap, TimedName};
use crate::time_extractor::TimeExtractor;
use crate::VenueRecord;
use tracing::debug;

/// A looser second look at the page, used when the primary pass finds too little.
///
/// Every line that mentions a keyword next to a time is taken at face value, and
/// configured venues get a wider time window than the primary pass allows.
#[derive(Debug, Clone)]
pub struct AlternativePass {
    classifier: LineClassifier,
    times: TimeExtractor,
    named_venues: Vec<String>,
    min_line_len: usize,
    max_line_len: usize,
    forward_range: usize,
}

impl AlternativePass {
    pub fn new(
        config: &ExtractorConfig,
        classifier: LineClassifier,
        times: TimeExtractor,
    ) -> Self {
        Self {
            classifier,
            times,
            named_venues: config.lowercased_named_venues(),
            min_line_len: config.alternative_min_line_len,
            max_line_len: config.alternative_max_line_len,
            forward_range: config.alternative_forward_range,
        }
    }

    pub fn extract(&self, lines: &[String]) -> ReconciliationMap {
        let mut map = ReconciliationMap::new();

        let inline = self.inline_times(lines);
        let windowed = self.named_venue_windows(lines);
        debug!(
            inline = inline.len(),
            windowed = windowed.len(),
            "alternative candidates"
        );

        Reconciler::reconcile_into(&mut map, inline.into_iter().chain(windowed));
        map
    }

    /// Lines naming a venue and carrying their own showtimes.
    fn inline_times(&self, lines: &[String]) -> Vec<TimedName> {
        lines
            .iter()
            .filter(|line| self.is_eligible(line))
            .filter(|line| {
                let len = char_len(line);
                len >= self.min_line_len && len <= self.max_line_len
            })
            .filter(|line| {
                self.classifier.contains_keyword(line) || self.mentions_named_venue(line)
            })
            .filter_map(|line| {
                let offset = self.times.first_time_offset(line)?;
                let name = clean_label(&line[..offset]);
                if !has_letter(name) {
                    return None;
                }
                Some(TimedName {
                    name: name.to_string(),
                    showtimes: self.times.tokens(line).map(ToOwned::to_owned).collect(),
                })
            })
            .collect()
    }

    /// Configured venues printed on a line of their own, with times further down the page.
    fn named_venue_windows(&self, lines: &[String]) -> Vec<TimedName> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                self.is_eligible(line)
                    && self.mentions_named_venue(line)
                    && !self.times.has_time(line)
            })
            .filter_map(|(index, line)| {
                let name = clean_label(line);
                if !has_letter(name) {
                    return None;
                }
                Some(TimedName {
                    name: name.to_string(),
                    showtimes: self.times.extract_times(lines, index, self.forward_range),
                })
            })
            .collect()
    }

    /// Exclusion patterns are not consulted: this pass takes keyword lines at face value.
    fn is_eligible(&self, line: &str) -> bool {
        !contains_url(line)
    }

    fn mentions_named_venue(&self, line: &str) -> bool {
        let lowercased = line.to_lowercase();
        self.named_venues
            .iter()
            .any(|venue| lowercased.contains(venue.as_str()))
    }
}

/// Appends alternative records that are not already represented.
///
/// A record is represented when a name already in the result contains it, or is contained
/// by it (ignoring case), or shares its normalized key. Represented records are dropped as a
/// whole: their showtimes are not folded into the record that matched.
pub fn merge_alternative(
    primary: Vec<VenueRecord>,
    alternative: Vec<VenueRecord>,
) -> Vec<VenueRecord> {
    let mut merged = primary;
    for record in alternative {
        if is_represented(&merged, &record.name) {
            debug!(name = record.name, "alternative record already represented");
            continue;
        }
        merged.push(record);
    }
    merged
}

fn is_represented(records: &[VenueRecord], name: &str) -> bool {
    let lowercased = name.to_lowercase();
    let key = NormalizedKey::from_name(name);
    records.iter().any(|existing| {
        let existing_lowercased = existing.name.to_lowercase();
        existing_lowercased.contains(&lowercased)
            || lowercased.contains(&existing_lowercased)
            || NormalizedKey::from_name(&existing.name) == key
    })
}
