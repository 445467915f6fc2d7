//! Pairing of two border segments for zipping and bridging.
//!
//! A source border edge is paired with a destination border edge. When the
//! source edge is selected, the selected run around it is paired too: the
//! source border is walked forward while the destination border is walked
//! backward, and the other way round, so the two segments face each other.

use std::collections::HashSet;

use tracing::debug;

use crate::error::TopologyError;
use crate::topology::{EdgeId, MergedEdgeId, TopologyStore};

/// Pairs `(source, destination)` border edges.
///
/// Returns `None` when the selected source run reaches the destination
/// edge. The result is ordered along the source border.
///
/// # Errors
///
/// Returns an error if a record is missing.
pub fn match_segments(
    store: &TopologyStore,
    source: EdgeId,
    dest: EdgeId,
    selected: &HashSet<MergedEdgeId>,
) -> Result<Option<Vec<(EdgeId, EdgeId)>>, TopologyError> {
    if !selected.contains(&store.merged_edge_of(source)?) {
        return Ok(Some(vec![(source, dest)]));
    }

    let is_selected = |e: EdgeId| -> Result<bool, TopologyError> {
        Ok(selected.contains(&store.merged_edge_of(e)?))
    };

    let mut forward = Vec::new();
    let mut current = source;
    while let Some(next) = store.next_border_edge(current)? {
        if next == source || !is_selected(next)? {
            break;
        }
        if next == dest {
            debug!("destination inside the selected source run");
            return Ok(None);
        }
        forward.push(next);
        current = next;
    }

    let mut backward = Vec::new();
    current = source;
    while let Some(prev) = store.prev_border_edge(current)? {
        if prev == source || forward.contains(&prev) || !is_selected(prev)? {
            break;
        }
        if prev == dest {
            debug!("destination inside the selected source run");
            return Ok(None);
        }
        backward.push(prev);
        current = prev;
    }

    let mut segment: HashSet<EdgeId> = forward.iter().chain(&backward).copied().collect();
    segment.insert(source);
    let mut used: HashSet<EdgeId> = HashSet::from([dest]);

    let Some(ahead) = pair_branch(store, dest, &forward, &segment, &mut used, false)? else {
        return Ok(Some(vec![(source, dest)]));
    };
    let Some(behind) = pair_branch(store, dest, &backward, &segment, &mut used, true)? else {
        return Ok(Some(vec![(source, dest)]));
    };

    let mut pairs: Vec<(EdgeId, EdgeId)> = behind.into_iter().rev().collect();
    pairs.push((source, dest));
    pairs.extend(ahead);
    Ok(Some(pairs))
}

/// Walks the destination border against one branch of the source run.
///
/// Returns `None` when the destination border closes on itself or reuses an
/// edge, which collapses the whole match to the single direct pair. A
/// destination step that lands on the source run drops this branch.
fn pair_branch(
    store: &TopologyStore,
    dest: EdgeId,
    branch: &[EdgeId],
    segment: &HashSet<EdgeId>,
    used: &mut HashSet<EdgeId>,
    forward_on_dest: bool,
) -> Result<Option<Vec<(EdgeId, EdgeId)>>, TopologyError> {
    let mut pairs = Vec::with_capacity(branch.len());
    let mut current = dest;
    for &s in branch {
        let step = if forward_on_dest {
            store.next_border_edge(current)?
        } else {
            store.prev_border_edge(current)?
        };
        let Some(d) = step else {
            return Ok(None);
        };
        if segment.contains(&d) {
            debug!(paired = pairs.len(), "destination walk met the source run");
            for (_, taken) in &pairs {
                used.remove(taken);
            }
            return Ok(Some(Vec::new()));
        }
        if !used.insert(d) {
            return Ok(None);
        }
        pairs.push((s, d));
        current = d;
    }
    Ok(Some(pairs))
}
