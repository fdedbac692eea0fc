use anyhow::{bail, Context};
use showtime_extractor::ShowtimeExtractor;

/// Prints the venues found in a page dump: `dry_run <page.txt> [supplementary.txt]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(page) = args.next() else {
        bail!("usage: dry_run <page.txt> [supplementary.txt]");
    };
    let supplementary = args.next();

    let text = tokio::fs::read_to_string(&page)
        .await
        .with_context(|| format!("Failed to read {page}"))?;
    let supplementary_text = match &supplementary {
        Some(file) => Some(
            tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read {file}"))?,
        ),
        None => None,
    };

    let extractor = ShowtimeExtractor::default();
    let venues = extractor.extract_with_fallback(&text, supplementary_text.as_deref());

    println!("{}", serde_json::to_string_pretty(&venues)?);
    Ok(())
}
