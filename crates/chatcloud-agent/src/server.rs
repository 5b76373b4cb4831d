use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::net::UnixListener;

use crate::layout::LayoutConfig;
use crate::session;
use crate::store::Dataset;

/// Accepts viewers on a Unix socket. Each viewer gets its own session over the
/// shared dataset.
pub async fn run(sock_path: &Path, dataset: Arc<Dataset>, layout: LayoutConfig) -> Result<()> {
    let listener = UnixListener::bind(sock_path)
        .with_context(|| format!("bind {}", sock_path.display()))?;
    tracing::info!(sock = %sock_path.display(), "chatcloud-agent listening");

    let mut next_viewer = 0u64;
    loop {
        let (stream, _addr) = listener.accept().await.context("accept viewer")?;
        next_viewer += 1;
        let viewer = next_viewer;
        tracing::info!(viewer, "viewer connected");

        let dataset = Arc::clone(&dataset);
        tokio::spawn(async move {
            match session::serve(stream, dataset, layout).await {
                Ok(()) => tracing::info!(viewer, "viewer disconnected"),
                Err(err) => tracing::warn!(viewer, error = %format!("{err:#}"), "viewer session failed"),
            }
        });
    }
}
