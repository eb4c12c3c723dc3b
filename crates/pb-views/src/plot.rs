//! Plot dispatch to the external projection service

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use pb_core::{DisplayChannel, ProjectionService, StateSnapshot};
use tracing::warn;

/// Minimum plot width, enforced regardless of how narrow the surface is.
pub const MIN_PLOT_WIDTH: u32 = 520;
/// Horizontal padding subtracted from the surface's available width.
pub const PLOT_WIDTH_MARGIN: u32 = 24;
/// Plots always render at this height.
pub const PLOT_HEIGHT: u32 = 460;

/// A target surface the projection service renders into.
pub struct PlotSurface {
    id: String,
    available_width: AtomicU32,
    has_content: AtomicBool,
}

impl PlotSurface {
    pub fn new(id: impl Into<String>, available_width: u32) -> Self {
        Self {
            id: id.into(),
            available_width: AtomicU32::new(available_width),
            has_content: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_available_width(&self, width: u32) {
        self.available_width.store(width, Ordering::Relaxed);
    }

    /// Plot geometry derived from the surface: width floored at
    /// `MIN_PLOT_WIDTH`, height fixed.
    pub fn plot_size(&self) -> (u32, u32) {
        let available = self.available_width.load(Ordering::Relaxed);
        let width = MIN_PLOT_WIDTH.max(available.saturating_sub(PLOT_WIDTH_MARGIN));
        (width, PLOT_HEIGHT)
    }

    /// Whether the surface currently presents as holding a plot.
    pub fn has_content(&self) -> bool {
        self.has_content.load(Ordering::Relaxed)
    }

    pub fn mark_content(&self) {
        self.has_content.store(true, Ordering::Relaxed);
    }

    /// Reset to the empty presentation, e.g. when new data is adopted.
    pub fn clear_content(&self) {
        self.has_content.store(false, Ordering::Relaxed);
    }
}

/// Packages the active dataset with surface geometry and invokes the
/// external projection service.
pub struct PlotDispatcher {
    service: Arc<dyn ProjectionService>,
    channel: Arc<DisplayChannel>,
}

impl PlotDispatcher {
    pub fn new(service: Arc<dyn ProjectionService>, channel: Arc<DisplayChannel>) -> Self {
        Self { service, channel }
    }

    /// Dispatch a projection of the snapshot's dataset onto `surface`.
    ///
    /// Empty datasets are refused with user-facing guidance and no side
    /// effects. Otherwise the surface is marked as holding content before
    /// the service call; the call may suspend, and its outcome is not
    /// returned to the caller (the service renders into the surface).
    pub async fn dispatch(&self, snapshot: Arc<StateSnapshot>, surface: &PlotSurface) {
        if snapshot.data.is_empty() {
            self.channel
                .warn("Load a file or select a built-in dataset (Iris) first.");
            return;
        }

        let (width, height) = surface.plot_size();
        surface.mark_content();
        if let Err(err) = self
            .service
            .render(snapshot.data.clone(), surface.id(), width, height)
            .await
        {
            warn!(target: "plot", surface = surface.id(), "projection service failed: {err:#}");
        }
    }
}
