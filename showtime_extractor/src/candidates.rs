use crate::classifier::LineClassifier;
use crate::matchers::{first_match, PrefixMatcher};
use crate::raw_text::{char_len, clean_label, contains_url, has_letter, is_all_digits};
use crate::time_extractor::TimeExtractor;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Captured by the named prefix matcher.
    StructuralPrefix(&'static str),
    ClassifierFallback,
    KeywordTimeCoOccurrence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueCandidate {
    pub source_line_index: usize,
    pub raw_name: String,
    pub window_start: usize,
    pub window_end: usize,
    pub strategy: Strategy,
}

impl VenueCandidate {
    pub fn window(&self) -> Range<usize> {
        self.window_start..self.window_end
    }
}

/// Lines already turned into a candidate by an earlier strategy.
#[derive(Debug, Clone)]
pub struct ClaimedLines(Vec<bool>);

impl ClaimedLines {
    pub fn new(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    fn claim(&mut self, index: usize) {
        if let Some(claimed) = self.0.get_mut(index) {
            *claimed = true;
        }
    }
}

pub struct CandidateGenerator {
    matchers: Vec<Box<dyn PrefixMatcher>>,
    classifier: LineClassifier,
    times: TimeExtractor,
    forward_range: usize,
    co_occurrence_max_line_len: usize,
}

impl CandidateGenerator {
    pub fn new(
        matchers: Vec<Box<dyn PrefixMatcher>>,
        classifier: LineClassifier,
        times: TimeExtractor,
        forward_range: usize,
        co_occurrence_max_line_len: usize,
    ) -> Self {
        Self {
            matchers,
            classifier,
            times,
            forward_range,
            co_occurrence_max_line_len,
        }
    }

    /// Strategy one: the first prefix matcher that fires names the venue.
    ///
    /// Excluded lines are skipped here as well as in the classifier, since the separator shape
    /// alone would turn "Movies in Hyderabad: 10:00 AM" into a venue.
    pub fn structural_prefix(
        &self,
        lines: &[String],
        claimed: &mut ClaimedLines,
    ) -> Vec<VenueCandidate> {
        self.generate(lines, claimed, |line| {
            if self.classifier.is_excluded(line) {
                return None;
            }
            first_match(&self.matchers, line)
                .map(|(matcher, label)| (Strategy::StructuralPrefix(matcher), label))
        })
    }

    /// Strategy two: the whole line, when the classifier accepts it.
    pub fn classifier_fallback(
        &self,
        lines: &[String],
        claimed: &mut ClaimedLines,
    ) -> Vec<VenueCandidate> {
        self.generate(lines, claimed, |line| {
            self.classifier
                .is_venue_line(line)
                .then(|| (Strategy::ClassifierFallback, line.to_string()))
        })
    }

    /// Strategy three: a keyword and a showtime on the same, reasonably short, line. The
    /// text before the first showtime names the venue.
    pub fn keyword_time_co_occurrence(
        &self,
        lines: &[String],
        claimed: &mut ClaimedLines,
    ) -> Vec<VenueCandidate> {
        self.generate(lines, claimed, |line| {
            if char_len(line) > self.co_occurrence_max_line_len
                || !self.classifier.contains_keyword(line)
            {
                return None;
            }
            let offset = self.times.first_time_offset(line)?;
            let label = clean_label(&line[..offset]);
            (char_len(label) >= 3).then(|| (Strategy::KeywordTimeCoOccurrence, label.to_string()))
        })
    }

    fn generate(
        &self,
        lines: &[String],
        claimed: &mut ClaimedLines,
        try_line: impl Fn(&str) -> Option<(Strategy, String)>,
    ) -> Vec<VenueCandidate> {
        let mut candidates = vec![];
        for (index, line) in lines.iter().enumerate() {
            if claimed.is_claimed(index) || !self.is_eligible(line) {
                continue;
            }
            if let Some((strategy, raw_name)) = try_line(line) {
                claimed.claim(index);
                candidates.push(self.candidate(lines.len(), index, raw_name, strategy));
            }
        }
        candidates
    }

    fn is_eligible(&self, line: &str) -> bool {
        has_letter(line) && !contains_url(line) && !is_all_digits(line)
    }

    fn candidate(
        &self,
        len: usize,
        index: usize,
        raw_name: String,
        strategy: Strategy,
    ) -> VenueCandidate {
        let window = self.times.window(len, index, self.forward_range);
        VenueCandidate {
            source_line_index: index,
            raw_name,
            window_start: window.start,
            window_end: window.end,
            strategy,
        }
    }
}
