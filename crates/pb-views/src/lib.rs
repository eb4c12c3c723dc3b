//! Presentation components: table preview and plot dispatch

pub mod plot;
pub mod table;

pub use plot::{PlotDispatcher, PlotSurface, MIN_PLOT_WIDTH, PLOT_HEIGHT, PLOT_WIDTH_MARGIN};
pub use table::{TablePreview, MAX_PREVIEW_ROWS};
