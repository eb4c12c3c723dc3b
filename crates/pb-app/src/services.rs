//! In-app implementations of the external collaborator seams

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pb_core::{ClipboardService, ProjectionService};
use pb_data::Dataset;
use tracing::info;

/// System clipboard backed by `arboard`.
///
/// Clipboard access is blocking, so writes run on the blocking pool.
pub struct ArboardClipboard;

#[async_trait]
impl ClipboardService for ArboardClipboard {
    async fn write_text(&self, text: &str) -> anyhow::Result<()> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)?;
            Ok(())
        })
        .await?
    }
}

/// Stand-in projection collaborator.
///
/// The real dimensionality-reduction backends live outside this system; this
/// one suspends briefly and reports what it would have drawn, so the
/// dispatch path (geometry, surface marking, interleaving) is exercised
/// end to end.
pub struct DemoProjection;

#[async_trait]
impl ProjectionService for DemoProjection {
    async fn render(
        &self,
        dataset: Arc<Dataset>,
        target: &str,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        info!(
            target: "projection",
            rows = dataset.len(),
            surface = target,
            width,
            height,
            "projection rendered"
        );
        Ok(())
    }
}
