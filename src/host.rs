//! Hooks through which operations report back to the host editor.

use crate::selection::SelectionUpdate;
use crate::topology::{PolygonId, TopologyStore};

/// Receives undo, geometry and selection notifications from operations.
///
/// All methods default to doing nothing.
pub trait EditHost {
    /// Called once, right before an operation makes its first change.
    fn snapshot_for_undo(&mut self, _store: &TopologyStore) {}

    /// Hands over polygons created by an operation for buffer rebuilding.
    fn commit_new_geometry(&mut self, _store: &TopologyStore, _polygons: &[PolygonId]) {}

    /// Reports a selection change implied by an edit.
    fn update_selection(&mut self, _update: SelectionUpdate) {}
}

/// Host that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl EditHost for NullHost {}

/// Host that stores every notification it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    /// Number of undo snapshots requested.
    pub snapshots: usize,
    /// Polygons passed to `commit_new_geometry`, in order.
    pub committed: Vec<PolygonId>,
    /// Selection updates, in the order they arrived.
    pub selection_updates: Vec<SelectionUpdate>,
}

impl RecordingHost {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditHost for RecordingHost {
    fn snapshot_for_undo(&mut self, _store: &TopologyStore) {
        self.snapshots += 1;
    }

    fn commit_new_geometry(&mut self, _store: &TopologyStore, polygons: &[PolygonId]) {
        self.committed.extend_from_slice(polygons);
    }

    fn update_selection(&mut self, update: SelectionUpdate) {
        self.selection_updates.push(update);
    }
}
