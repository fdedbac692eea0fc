use showtime_extractor::ShowtimeExtractor;
use showtime_monitor::config::Settings;
use showtime_monitor::file_source::FileTextSource;
use showtime_monitor::snapshot_store::JsonSnapshotStore;
use showtime_monitor::ShowtimeMonitor;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared_kernel::tracing::config_telemetry("showtime_monitor");
    start().await
}

async fn start() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    let extractor = Arc::new(ShowtimeExtractor::new(settings.extractor)?);
    let source = Arc::new(FileTextSource::new(std::env::current_dir()?));
    let store = Arc::new(JsonSnapshotStore::new(settings.snapshot.directory));

    let monitor = ShowtimeMonitor::new(extractor, source, store, settings.subjects);

    for update in monitor.run().await? {
        if update.changes.is_empty() {
            info!(subject = update.subject, "no showtime changes");
            continue;
        }
        info!(
            subject = update.subject,
            changes = serde_json::to_string(&update.changes)?,
            "showtimes changed"
        );
    }

    Ok(())
}
