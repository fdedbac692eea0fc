use crate::raw_text::char_len;
use crate::VenueRecord;
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};

/// Case and punctuation insensitive form of a venue name, used only for deduplication.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn from_name(name: &str) -> Self {
        let kept = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>();
        NormalizedKey(kept.split_whitespace().join(" "))
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Insertion ordered `NormalizedKey -> VenueRecord` map.
///
/// Records come out in the order their key was first seen, whatever happens to them later.
#[derive(Debug, Default, Clone)]
pub struct ReconciliationMap {
    records: Vec<VenueRecord>,
    positions: HashMap<NormalizedKey, usize>,
}

impl ReconciliationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a venue or folds it into the record sharing its key.
    ///
    /// Times are unioned. The stored name is only replaced by a strictly longer one, so the
    /// first name seen wins ties.
    pub fn merge(&mut self, name: String, showtimes: BTreeSet<String>) {
        let key = NormalizedKey::from_name(&name);
        match self.positions.get(&key) {
            Some(&position) => {
                let record = &mut self.records[position];
                record.showtimes.extend(showtimes);
                if char_len(&name) > char_len(&record.name) {
                    record.name = name;
                }
            }
            None => {
                self.positions.insert(key, self.records.len());
                self.records.push(VenueRecord { name, showtimes });
            }
        }
    }

    pub fn get(&self, key: &NormalizedKey) -> Option<&VenueRecord> {
        self.positions
            .get(key)
            .and_then(|&position| self.records.get(position))
    }

    pub fn contains_key(&self, key: &NormalizedKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VenueRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<VenueRecord> {
        self.records
    }
}

/// A venue name with the showtimes found around it, ready to be reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedName {
    pub name: String,
    pub showtimes: BTreeSet<String>,
}

pub struct Reconciler;

impl Reconciler {
    /// Folds candidates, in generation order, into `map`. Candidates without times are dropped.
    pub fn reconcile_into(
        map: &mut ReconciliationMap,
        candidates: impl IntoIterator<Item = TimedName>,
    ) {
        candidates
            .into_iter()
            .filter(|candidate| !candidate.showtimes.is_empty())
            .for_each(|candidate| map.merge(candidate.name, candidate.showtimes));
    }

    pub fn reconcile(candidates: impl IntoIterator<Item = TimedName>) -> ReconciliationMap {
        let mut map = ReconciliationMap::new();
        Self::reconcile_into(&mut map, candidates);
        map
    }
}

#[cfg(test)]
mod tests {
    use crate::reconciler::{NormalizedKey, Reconciler, TimedName};
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn timed(name: &str, times: &[&str]) -> TimedName {
        TimedName {
            name: name.to_string(),
            showtimes: times.iter().map(|time| time.to_string()).collect(),
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[rstest]
    #[case("PVR Cinema", "pvr cinema")]
    #[case("  PVR   Cinema!! ", "pvr cinema")]
    #[case("AMB Cinemas: Gachibowli, Hyderabad", "amb cinemas gachibowli hyderabad")]
    #[case("Sudarshan 35mm (4K)", "sudarshan 35mm 4k")]
    #[case("Prasads - Screen 1", "prasads screen 1")]
    #[case("---", "")]
    fn normalizes_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(NormalizedKey::from_name(name).as_ref(), expected)
    }

    #[test]
    fn same_key_yields_one_record_with_unioned_times() {
        let map = Reconciler::reconcile(vec![
            timed("PVR Cinema", &["10:00 AM", "2:30 PM"]),
            timed("pvr cinema!", &["2:30 PM", "6:00 PM"]),
        ]);

        assert_eq!(map.len(), 1);
        let record = &map.records()[0];
        assert_eq!(record.name, "pvr cinema!");
        assert_eq!(record.showtimes, set(&["10:00 AM", "2:30 PM", "6:00 PM"]));
    }

    #[test]
    fn first_seen_name_wins_ties() {
        let map = Reconciler::reconcile(vec![
            timed("PVR Cinema", &["10:00 AM"]),
            timed("pvr cinema", &["6:00 PM"]),
        ]);

        assert_eq!(map.records()[0].name, "PVR Cinema");
    }

    #[test]
    fn longer_name_replaces_shorter_one_as_it_arrives() {
        let map = Reconciler::reconcile(vec![
            timed("AMB Cinemas", &["10:00 AM"]),
            timed("AMB  Cinemas", &["1:00 PM"]),
            timed("AMB Cinemas.", &["4:00 PM"]),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.records()[0].name, "AMB  Cinemas");
    }

    #[test]
    fn output_keeps_first_insertion_order() {
        let map = Reconciler::reconcile(vec![
            timed("Devi 70mm", &["9:00 AM"]),
            timed("AMB Cinemas", &["10:00 AM"]),
            timed("DEVI 70MM", &["6:00 PM"]),
            timed("Asian Mukta", &["1:00 PM"]),
        ]);

        let names = map
            .into_records()
            .into_iter()
            .map(|record| record.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Devi 70mm", "AMB Cinemas", "Asian Mukta"]);
    }

    #[test]
    fn candidates_without_times_are_dropped() {
        let map = Reconciler::reconcile(vec![timed("Devi 70mm", &[])]);
        assert!(map.is_empty());
    }

    #[test]
    fn lookups_go_through_the_normalized_key() {
        let map = Reconciler::reconcile(vec![timed("Devi 70mm", &["9:00 AM"])]);
        let key = NormalizedKey::from_name("devi-70mm");

        assert!(!map.contains_key(&key));
        assert!(map.contains_key(&NormalizedKey::from_name("DEVI 70MM")));
        assert_eq!(
            map.get(&NormalizedKey::from_name("devi 70mm"))
                .map(|record| record.name.as_str()),
            Some("Devi 70mm")
        );
    }
}
