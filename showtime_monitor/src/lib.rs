pub mod config;
pub mod diff;
pub mod file_source;
pub mod snapshot_store;

use crate::config::Subject;
use crate::diff::ShowtimeChanges;
use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use showtime_extractor::{ShowtimeExtractor, VenueRecord};
use std::sync::Arc;
use tracing::{error, info};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageTextSource: Send + Sync {
    async fn fetch_text(&self, subject: &Subject) -> anyhow::Result<String>;

    /// A second rendering of the page, if the subject has one.
    async fn fetch_supplementary_text(&self, subject: &Subject) -> anyhow::Result<Option<String>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, subject: &Subject) -> anyhow::Result<Option<Snapshot>>;
    async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// The venues last extracted for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub subject: String,
    pub captured_at: DateTime<Utc>,
    pub venues: Vec<VenueRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectUpdate {
    pub subject: String,
    pub venues: Vec<VenueRecord>,
    pub changes: ShowtimeChanges,
}

pub struct ShowtimeMonitor {
    extractor: Arc<ShowtimeExtractor>,
    source: Arc<dyn PageTextSource>,
    store: Arc<dyn SnapshotStore>,
    subjects: Vec<Subject>,
}

impl ShowtimeMonitor {
    pub fn new(
        extractor: Arc<ShowtimeExtractor>,
        source: Arc<dyn PageTextSource>,
        store: Arc<dyn SnapshotStore>,
        subjects: Vec<Subject>,
    ) -> Self {
        Self {
            extractor,
            source,
            store,
            subjects,
        }
    }

    /// Checks every subject once. A subject that fails is logged and skipped; the run only
    /// fails when no subject could be checked.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn run(&self) -> anyhow::Result<Vec<SubjectUpdate>> {
        let mut futures: FuturesUnordered<_> = self
            .subjects
            .iter()
            .map(|subject| self.check(subject))
            .collect();

        let mut errors = vec![];
        let mut updates = Vec::with_capacity(self.subjects.len());

        while let Some(result) = futures.next().await {
            match result {
                Ok(update) => updates.push(update),
                Err(error) => errors.push(error),
            }
        }

        if !errors.is_empty() {
            error!("{errors:?}")
        }
        if updates.is_empty() && !errors.is_empty() {
            bail!("{errors:?}")
        }

        Ok(updates)
    }

    async fn check(&self, subject: &Subject) -> anyhow::Result<SubjectUpdate> {
        let text = self
            .source
            .fetch_text(subject)
            .await
            .with_context(|| format!("Failed to fetch text for {}", subject.name))?;
        let supplementary = self
            .source
            .fetch_supplementary_text(subject)
            .await
            .with_context(|| format!("Failed to fetch supplementary text for {}", subject.name))?;

        let venues = self
            .extractor
            .extract_with_fallback(&text, supplementary.as_deref());

        let previous = self
            .store
            .load(subject)
            .await
            .with_context(|| format!("Failed to load the snapshot of {}", subject.name))?;
        let changes = ShowtimeChanges::between(
            previous
                .as_ref()
                .map(|snapshot| snapshot.venues.as_slice())
                .unwrap_or_default(),
            &venues,
        );

        self.store
            .save(&Snapshot {
                subject: subject.name.clone(),
                captured_at: Utc::now(),
                venues: venues.clone(),
            })
            .await
            .with_context(|| format!("Failed to save the snapshot of {}", subject.name))?;

        info!(
            subject = subject.name,
            venues = venues.len(),
            new_venues = changes.new_venues.len(),
            added_showtimes = changes.added_showtimes.len(),
            "subject checked"
        );

        Ok(SubjectUpdate {
            subject: subject.name.clone(),
            venues,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Subject;
    use crate::{
        MockPageTextSource, MockSnapshotStore, PageTextSource, ShowtimeMonitor, Snapshot,
        SnapshotStore,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use showtime_extractor::{ShowtimeExtractor, VenueRecord};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    struct InMemoryPages(HashMap<String, String>);

    #[async_trait]
    impl PageTextSource for InMemoryPages {
        async fn fetch_text(&self, subject: &Subject) -> anyhow::Result<String> {
            self.0
                .get(&subject.name)
                .cloned()
                .ok_or_else(|| anyhow!("no page for {}", subject.name))
        }

        async fn fetch_supplementary_text(
            &self,
            _subject: &Subject,
        ) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct InMemorySnapshots(Mutex<HashMap<String, Snapshot>>);

    #[async_trait]
    impl SnapshotStore for InMemorySnapshots {
        async fn load(&self, subject: &Subject) -> anyhow::Result<Option<Snapshot>> {
            let snapshots = self.0.lock().map_err(|err| anyhow!("{err}"))?;
            Ok(snapshots.get(&subject.name).cloned())
        }

        async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
            let mut snapshots = self.0.lock().map_err(|err| anyhow!("{err}"))?;
            snapshots.insert(snapshot.subject.clone(), snapshot.clone());
            Ok(())
        }
    }

    fn subject(name: &str) -> Subject {
        Subject {
            name: name.to_string(),
            text_file: PathBuf::from(format!("{name}.txt")),
            supplementary_file: None,
        }
    }

    fn pages(entries: &[(&str, &str)]) -> Arc<InMemoryPages> {
        Arc::new(InMemoryPages(
            entries
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        ))
    }

    fn record(name: &str, times: &[&str]) -> VenueRecord {
        VenueRecord {
            name: name.to_string(),
            showtimes: times.iter().map(|time| time.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn first_run_reports_everything_and_later_runs_only_additions() {
        let store = Arc::new(InMemorySnapshots::default());
        let extractor = Arc::new(ShowtimeExtractor::default());

        let first = ShowtimeMonitor::new(
            extractor.clone(),
            pages(&[("hyderabad", "PVR Cinema: 10:00 AM, 2:30 PM\n")]),
            store.clone(),
            vec![subject("hyderabad")],
        )
        .run()
        .await
        .expect("first run to succeed");

        assert_eq!(first.len(), 1);
        assert_eq!(
            first[0].changes.new_venues,
            vec![record("PVR Cinema", &["10:00 AM", "2:30 PM"])]
        );

        let second = ShowtimeMonitor::new(
            extractor,
            pages(&[("hyderabad", "PVR Cinema: 10:00 AM, 2:30 PM, 9:00 PM\n")]),
            store.clone(),
            vec![subject("hyderabad")],
        )
        .run()
        .await
        .expect("second run to succeed");

        assert!(second[0].changes.new_venues.is_empty());
        assert_eq!(
            second[0].changes.added_showtimes,
            vec![record("PVR Cinema", &["9:00 PM"])]
        );
        let saved = store
            .load(&subject("hyderabad"))
            .await
            .expect("store to be readable")
            .expect("snapshot to be saved");
        assert_eq!(
            saved.venues,
            vec![record("PVR Cinema", &["10:00 AM", "2:30 PM", "9:00 PM"])]
        );
    }

    #[tokio::test]
    async fn failing_subjects_do_not_stop_the_others() {
        let monitor = ShowtimeMonitor::new(
            Arc::new(ShowtimeExtractor::default()),
            pages(&[("hyderabad", "Devi 70mm: 6:30 PM\n")]),
            Arc::new(InMemorySnapshots::default()),
            vec![subject("hyderabad"), subject("missing")],
        );

        let updates = monitor.run().await.expect("one subject to succeed");

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].subject, "hyderabad");
    }

    #[tokio::test]
    async fn run_fails_when_every_subject_fails() {
        let mut source = MockPageTextSource::new();
        source
            .expect_fetch_text()
            .returning(|_| Err(anyhow!("page unavailable")));
        let store = MockSnapshotStore::new();

        let monitor = ShowtimeMonitor::new(
            Arc::new(ShowtimeExtractor::default()),
            Arc::new(source),
            Arc::new(store),
            vec![subject("hyderabad"), subject("secunderabad")],
        );

        assert!(monitor.run().await.is_err());
    }

    #[tokio::test]
    async fn supplementary_text_feeds_the_alternative_pass() {
        let mut source = MockPageTextSource::new();
        source
            .expect_fetch_text()
            .returning(|_| Ok("PVR Cinema: 10:00 AM\n".to_string()));
        source
            .expect_fetch_supplementary_text()
            .returning(|_| Ok(Some("Devi 70mm 6:30 PM\n".to_string())));
        let mut store = MockSnapshotStore::new();
        store.expect_load().returning(|_| {
            Ok(Some(Snapshot {
                subject: "hyderabad".to_string(),
                captured_at: Utc::now(),
                venues: vec![record("PVR Cinema", &["10:00 AM"])],
            }))
        });
        store.expect_save().times(1).returning(|_| Ok(()));

        let monitor = ShowtimeMonitor::new(
            Arc::new(ShowtimeExtractor::default()),
            Arc::new(source),
            Arc::new(store),
            vec![subject("hyderabad")],
        );

        let updates = monitor.run().await.expect("run to succeed");

        assert_eq!(
            updates[0].changes.new_venues,
            vec![record("Devi 70mm", &["6:30 PM"])]
        );
        assert!(updates[0].changes.added_showtimes.is_empty());
    }
}
