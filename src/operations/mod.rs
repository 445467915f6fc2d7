//! Editing operations over a [`TopologyStore`](crate::topology::TopologyStore).
//!
//! Each operation is a small struct built with `new(..)` and run with
//! `execute(..)`. Operations that mutate decide every no-op case before
//! touching the store and call [`EditHost::snapshot_for_undo`] exactly once,
//! right before the first change.

pub mod border;
pub mod bridge;
pub mod creation;
pub mod matching;
pub mod merge;
pub mod modification;
pub mod query;
pub(crate) mod shading;
pub mod smooth;
pub mod split;

use crate::error::TopologyError;
use crate::host::EditHost;
use crate::selection::SelectionUpdate;
use crate::topology::{EdgeId, MergedEdgeId, PolygonId, TopologyStore};

/// Result of an operation that may also change the host's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditOutcome {
    /// The store was modified.
    pub changed: bool,
    /// A [`SelectionUpdate`] was sent to the host.
    pub selection_changed: bool,
}

impl EditOutcome {
    /// Nothing happened.
    pub const UNCHANGED: Self = Self {
        changed: false,
        selection_changed: false,
    };
}

/// Returns the only member of a border merged edge, or `None` if the merged
/// edge is interior.
pub(crate) fn border_member(
    store: &TopologyStore,
    id: MergedEdgeId,
) -> Result<Option<EdgeId>, TopologyError> {
    let data = store.merged_edge(id)?;
    Ok(match data.edges.as_slice() {
        [e] => Some(*e),
        _ => None,
    })
}

/// Forwards to another host but lets only the first undo snapshot through,
/// so composed operations snapshot once.
pub(crate) struct SnapshotOnce<'a, H: EditHost + ?Sized> {
    inner: &'a mut H,
    taken: bool,
}

impl<'a, H: EditHost + ?Sized> SnapshotOnce<'a, H> {
    pub(crate) fn new(inner: &'a mut H) -> Self {
        Self {
            inner,
            taken: false,
        }
    }
}

impl<H: EditHost + ?Sized> EditHost for SnapshotOnce<'_, H> {
    fn snapshot_for_undo(&mut self, store: &TopologyStore) {
        if !self.taken {
            self.taken = true;
            self.inner.snapshot_for_undo(store);
        }
    }

    fn commit_new_geometry(&mut self, store: &TopologyStore, polygons: &[PolygonId]) {
        self.inner.commit_new_geometry(store, polygons);
    }

    fn update_selection(&mut self, update: SelectionUpdate) {
        self.inner.update_selection(update);
    }
}
