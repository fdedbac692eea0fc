use itertools::Itertools;
use serde::Serialize;
use showtime_extractor::reconciler::NormalizedKey;
use showtime_extractor::VenueRecord;
use std::collections::{BTreeSet, HashMap};

/// What a subject gained since it was last seen.
///
/// Venues and showtimes that disappeared are not reported: listings drop past shows all day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShowtimeChanges {
    pub new_venues: Vec<VenueRecord>,
    /// Known venues, each carrying only the showtimes it did not have before.
    pub added_showtimes: Vec<VenueRecord>,
}

impl ShowtimeChanges {
    pub fn between(previous: &[VenueRecord], current: &[VenueRecord]) -> Self {
        let previous = previous
            .iter()
            .map(|record| (NormalizedKey::from_name(&record.name), record))
            .collect::<HashMap<_, _>>();

        let (new_venues, known_venues): (Vec<_>, Vec<_>) = current
            .iter()
            .map(|record| (previous.get(&NormalizedKey::from_name(&record.name)), record))
            .partition(|(seen, _)| seen.is_none());

        let added_showtimes = known_venues
            .into_iter()
            .filter_map(|(seen, record)| {
                let seen = seen?;
                let showtimes = record
                    .showtimes
                    .difference(&seen.showtimes)
                    .cloned()
                    .collect::<BTreeSet<_>>();
                (!showtimes.is_empty()).then(|| VenueRecord {
                    name: record.name.clone(),
                    showtimes,
                })
            })
            .collect_vec();

        Self {
            new_venues: new_venues
                .into_iter()
                .map(|(_, record)| record.clone())
                .collect(),
            added_showtimes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_venues.is_empty() && self.added_showtimes.is_empty()
    }
}
