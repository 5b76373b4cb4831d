mod binner;
mod brush;
mod config;
mod frequency;
mod ingest;
mod layout;
mod segment;
mod server;
mod session;
mod store;

use anyhow::{Context, Result};
use config::parse_args;
use layout::{LayoutConfig, LayoutPass};
use segment::WordSegmenter;
use std::path::PathBuf;
use std::sync::Arc;
use store::Dataset;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn runtime_sock_path() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(dir).join("chatcloud.sock")
    } else {
        PathBuf::from("/tmp/chatcloud.sock")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let config = parse_args()?;

    let report = ingest::load_events(&config.data, &WordSegmenter)?;
    tracing::info!(
        path = %config.data.display(),
        events = report.events.len(),
        skipped = report.skipped,
        "records loaded"
    );
    let dataset = Arc::new(Dataset::new(report.events));
    tracing::info!(buckets = dataset.buckets.len(), "timeline built");

    if config.dump {
        let out = dump_json(&dataset, config.layout_config())?;
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let sock_path = config.sock.clone().unwrap_or_else(runtime_sock_path);
    let _ = std::fs::remove_file(&sock_path); // stale socket from an earlier run

    server::run(&sock_path, dataset, config.layout_config()).await
}

/// One full-range pass, printed instead of served.
fn dump_json(dataset: &Dataset, layout: LayoutConfig) -> Result<serde_json::Value> {
    let words = frequency::frequencies(&dataset.events);
    let result = LayoutPass::new(1, words, layout, CancellationToken::new())
        .place_all()
        .context("layout pass cancelled")?;
    tracing::info!(
        placed = result.placements.len(),
        dropped = result.dropped.len(),
        "layout ready"
    );
    Ok(serde_json::json!({
        "canvas": { "width": layout.width, "height": layout.height },
        "timeline": dataset.buckets,
        "placements": result.placements,
        "dropped": result.dropped,
    }))
}
