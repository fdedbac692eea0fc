use crate::config::Subject;
use crate::{Snapshot, SnapshotStore};
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// One pretty-printed JSON file per subject.
pub struct JsonSnapshotStore {
    directory: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, subject: &str) -> PathBuf {
        self.directory
            .join(format!("{}.json", snapshot_file_stem(subject)))
    }
}

/// File name (without extension) of a subject's snapshot. Anything other than letters, digits
/// and `-` becomes `_`, so distinct names can share a stem: "a/b" and "a_b" both map to "a_b".
pub fn snapshot_file_stem(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self, subject: &Subject) -> anyhow::Result<Option<Snapshot>> {
        let path = self.path_for(&subject.name);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let snapshot = serde_json::from_slice(&contents)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create {}", self.directory.display()))?;

        let path = self.path_for(&snapshot.subject);
        let contents =
            serde_json::to_vec_pretty(snapshot).context("Failed to serialize snapshot")?;
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
