use crate::config::Subject;
use crate::PageTextSource;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads page text that a renderer already dumped to disk.
pub struct FileTextSource {
    base_directory: PathBuf,
}

impl FileTextSource {
    /// Relative subject paths are resolved against `base_directory`.
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
        }
    }

    async fn read(&self, file: &Path) -> anyhow::Result<String> {
        let path = self.base_directory.join(file);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[async_trait]
impl PageTextSource for FileTextSource {
    async fn fetch_text(&self, subject: &Subject) -> anyhow::Result<String> {
        self.read(&subject.text_file).await
    }

    async fn fetch_supplementary_text(&self, subject: &Subject) -> anyhow::Result<Option<String>> {
        match &subject.supplementary_file {
            Some(file) => self.read(file).await.map(Some),
            None => Ok(None),
        }
    }
}
