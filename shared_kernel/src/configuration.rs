use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

pub fn config<Settings: DeserializeOwned>() -> anyhow::Result<Settings> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    config_from_directory(&base_path.join("configuration"))
}

/// Loads `base.yaml` (`test.yaml` in tests) from `configuration_directory` and overlays
/// `APP_` prefixed environment variables, eg: `APP_EXTRACTOR__LOW_COUNT_THRESHOLD=5`
pub fn config_from_directory<Settings: DeserializeOwned>(
    configuration_directory: &Path,
) -> anyhow::Result<Settings> {
    let file = if cfg!(test) { "test.yaml" } else { "base.yaml" };
    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join(file)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .with_context(|| {
            format!(
                "Failed to build configuration from {}",
                configuration_directory.display()
            )
        })?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}
