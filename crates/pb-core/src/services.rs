//! Trait seams to external collaborators

use std::sync::Arc;

use async_trait::async_trait;
use pb_data::Dataset;

/// External dimensionality-reduction and plotting collaborator.
///
/// The service renders directly into the surface named by `target`; nothing
/// comes back to the caller besides success or failure of the call itself.
#[async_trait]
pub trait ProjectionService: Send + Sync {
    async fn render(
        &self,
        dataset: Arc<Dataset>,
        target: &str,
        width: u32,
        height: u32,
    ) -> anyhow::Result<()>;
}

/// External clipboard collaborator.
#[async_trait]
pub trait ClipboardService: Send + Sync {
    async fn write_text(&self, text: &str) -> anyhow::Result<()>;
}
