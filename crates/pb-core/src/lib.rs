//! Core state and shared channels for plotbench
//!
//! This crate provides the active-dataset state, the shared display channel,
//! and the trait seams to external collaborators (projection, clipboard).

pub mod display;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use display::{DisplayChannel, DisplayEntry, DisplayKind};
pub use services::{ClipboardService, ProjectionService};
pub use state::{AppState, DatasetOrigin, StateSnapshot};
