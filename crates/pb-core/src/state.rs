//! Active dataset state with atomic snapshot replacement

use std::sync::Arc;

use parking_lot::RwLock;
use pb_data::Dataset;
use tracing::info;

/// Where the active dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrigin {
    Builtin,
    File,
}

impl DatasetOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetOrigin::Builtin => "builtin",
            DatasetOrigin::File => "file",
        }
    }
}

/// One consistent view of the active dataset and its provenance.
///
/// The three fields live in a single immutable snapshot, so a reader can
/// never observe a stale dataset paired with a new name.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub data: Arc<Dataset>,
    pub origin: Option<DatasetOrigin>,
    pub name: Option<String>,
}

impl StateSnapshot {
    fn initial() -> Self {
        Self {
            data: Arc::new(Dataset::empty()),
            origin: None,
            name: None,
        }
    }
}

/// Holder for the single active dataset.
///
/// Mutation is atomic-by-replacement: `adopt` swaps in a whole new snapshot
/// under one short write lock, and readers clone the current `Arc`.
pub struct AppState {
    current: RwLock<Arc<StateSnapshot>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(StateSnapshot::initial())),
        }
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.current.read().clone()
    }

    /// Replace the active dataset, its origin and its label as one
    /// indivisible action. Returns the snapshot that was adopted.
    pub fn adopt(
        &self,
        data: Dataset,
        origin: DatasetOrigin,
        name: impl Into<String>,
    ) -> Arc<StateSnapshot> {
        let name = name.into();
        info!(rows = data.len(), origin = origin.as_str(), %name, "adopting dataset");
        let snapshot = Arc::new(StateSnapshot {
            data: Arc::new(data),
            origin: Some(origin),
            name: Some(name),
        });
        *self.current.write() = snapshot.clone();
        snapshot
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
