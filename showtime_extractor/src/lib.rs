pub mod alternative;
pub mod candidates;
pub mod classifier;
pub mod config;
pub mod matchers;
pub mod raw_text;
pub mod reconciler;
pub mod refiner;
pub mod time_extractor;

use crate::alternative::AlternativePass;
use crate::candidates::{CandidateGenerator, ClaimedLines, VenueCandidate};
use crate::classifier::LineClassifier;
use crate::matchers::build_matchers;
use crate::raw_text::RawText;
use crate::reconciler::{Reconciler, ReconciliationMap, TimedName};
use crate::refiner::NameRefiner;
use crate::time_extractor::TimeExtractor;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

pub use crate::alternative::merge_alternative;
pub use crate::config::{ConfigError, ExtractorConfig};

/// A screening location and every showtime found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub name: String,
    pub showtimes: BTreeSet<String>,
}

lazy_static! {
    static ref DEFAULT_EXTRACTOR: ShowtimeExtractor = ShowtimeExtractor::default();
}

/// Turns rendered page text into deduplicated venue records.
///
/// Holds nothing but compiled configuration, so one instance can be shared across threads.
pub struct ShowtimeExtractor {
    low_count_threshold: usize,
    times: TimeExtractor,
    candidates: CandidateGenerator,
    refiner: NameRefiner,
    alternative: AlternativePass,
}

impl ShowtimeExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let times = TimeExtractor::new(&config)?;
        let classifier = LineClassifier::new(&config, times.clone())?;
        let matchers = build_matchers(&config)?;

        Ok(Self {
            low_count_threshold: config.low_count_threshold,
            refiner: NameRefiner::new(&config, times.clone()),
            alternative: AlternativePass::new(&config, classifier.clone(), times.clone()),
            candidates: CandidateGenerator::new(
                matchers,
                classifier,
                times.clone(),
                config.forward_range,
                config.co_occurrence_max_line_len,
            ),
            times,
        })
    }

    #[tracing::instrument(skip_all, level = "debug")]
    pub fn extract_venues(&self, text: &str) -> Vec<VenueRecord> {
        let raw = RawText::from_text(text);
        let lines = raw.lines();
        let mut claimed = ClaimedLines::new(lines.len());
        let mut map = ReconciliationMap::new();

        let structural = self.candidates.structural_prefix(lines, &mut claimed);
        let fallback = self.candidates.classifier_fallback(lines, &mut claimed);
        debug!(
            lines = lines.len(),
            structural = structural.len(),
            fallback = fallback.len(),
            "primary candidates"
        );
        self.reconcile(&mut map, lines, structural.into_iter().chain(fallback));

        if map.len() < self.low_count_threshold {
            let co_occurrence = self
                .candidates
                .keyword_time_co_occurrence(lines, &mut claimed);
            debug!(
                records = map.len(),
                co_occurrence = co_occurrence.len(),
                "keyword and time candidates"
            );
            self.reconcile(&mut map, lines, co_occurrence);
        }

        debug!(records = map.len(), "primary pass done");
        map.into_records()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    pub fn extract_venues_alternative(&self, text: &str) -> Vec<VenueRecord> {
        let raw = RawText::from_text(text);
        let records = self.alternative.extract(raw.lines()).into_records();
        debug!(records = records.len(), "alternative pass done");
        records
    }

    /// Runs the primary pass and, when it finds fewer venues than the configured threshold,
    /// tops the result up with the alternative pass over `supplementary` (or `text` itself).
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn extract_with_fallback(
        &self,
        text: &str,
        supplementary: Option<&str>,
    ) -> Vec<VenueRecord> {
        let primary = self.extract_venues(text);
        if primary.len() >= self.low_count_threshold {
            return primary;
        }

        info!(
            records = primary.len(),
            threshold = self.low_count_threshold,
            supplementary = supplementary.is_some(),
            "few venues found, running the alternative pass"
        );
        let alternative = self.extract_venues_alternative(supplementary.unwrap_or(text));
        self.merge_alternative(primary, alternative)
    }

    pub fn merge_alternative(
        &self,
        primary: Vec<VenueRecord>,
        alternative: Vec<VenueRecord>,
    ) -> Vec<VenueRecord> {
        merge_alternative(primary, alternative)
    }

    fn reconcile(
        &self,
        map: &mut ReconciliationMap,
        lines: &[String],
        candidates: impl IntoIterator<Item = VenueCandidate>,
    ) {
        let timed = candidates
            .into_iter()
            .map(|candidate| self.resolve(lines, candidate));
        Reconciler::reconcile_into(map, timed);
    }

    fn resolve(&self, lines: &[String], candidate: VenueCandidate) -> TimedName {
        let index = candidate.source_line_index;
        TimedName {
            name: self.refiner.refine(lines, index, &candidate.raw_name),
            showtimes: self.times.extract_times_in(lines, index, candidate.window()),
        }
    }
}

impl Default for ShowtimeExtractor {
    fn default() -> Self {
        ShowtimeExtractor::new(ExtractorConfig::default())
            .expect("curated extractor configuration to be valid")
    }
}

/// [`ShowtimeExtractor::extract_venues`] with the curated configuration.
pub fn extract_venues(text: &str) -> Vec<VenueRecord> {
    DEFAULT_EXTRACTOR.extract_venues(text)
}

/// [`ShowtimeExtractor::extract_venues_alternative`] with the curated configuration.
pub fn extract_venues_alternative(text: &str) -> Vec<VenueRecord> {
    DEFAULT_EXTRACTOR.extract_venues_alternative(text)
}
