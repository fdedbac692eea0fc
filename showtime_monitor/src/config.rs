use crate::snapshot_store::snapshot_file_stem;
use anyhow::bail;
use itertools::Itertools;
use serde::Deserialize;
use shared_kernel::configuration::config;
use showtime_extractor::ExtractorConfig;
use std::path::PathBuf;

/// One monitored page, eg: a film's listing for one city.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    /// Rendered text of the listing page.
    pub text_file: PathBuf,
    /// Text of a second rendering (eg: the mobile layout) read by the alternative pass.
    #[serde(default)]
    pub supplementary_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub subjects: Vec<Subject>,
    pub snapshot: SnapshotSettings,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Each subject must map to its own snapshot file.
    pub fn validate(&self) -> anyhow::Result<()> {
        let clashes = self
            .subjects
            .iter()
            .map(|subject| snapshot_file_stem(&subject.name))
            .duplicates()
            .collect_vec();
        if !clashes.is_empty() {
            bail!(
                "Subjects share a snapshot file: {}",
                clashes.iter().join(", ")
            );
        }
        Ok(())
    }
}
