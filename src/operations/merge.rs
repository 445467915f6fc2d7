use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::{Result, TopologyError};
use crate::host::EditHost;
use crate::operations::matching::match_segments;
use crate::operations::shading::{groups_of_polygons, polygons_around, refresh_group_normals};
use crate::operations::{border_member, EditOutcome};
use crate::selection::{Selection, SelectionUpdate};
use crate::topology::{EdgeId, MergedEdgeId, MergedVertexId, PolygonId, TopologyStore};
use crate::union_find::DisjointSet;

/// Welds two border segments together, like closing a zipper.
///
/// The source edge (and the selected run around it) is paired with the
/// destination border. Each pair's endpoints are welded, the destination
/// side keeping its position, and the two edges become one interior edge.
/// Pairs that would weld two corners of the same polygon are skipped.
pub struct MergeEdges {
    source: MergedEdgeId,
    dest: MergedEdgeId,
}

/// Pending vertex welds with the polygons each pending merged vertex touches.
struct Welds {
    sets: DisjointSet<MergedVertexId>,
    polygons: HashMap<MergedVertexId, HashSet<PolygonId>>,
}

impl Welds {
    fn new() -> Self {
        Self {
            sets: DisjointSet::new(),
            polygons: HashMap::new(),
        }
    }

    fn polygons_of(
        &mut self,
        store: &TopologyStore,
        mv: MergedVertexId,
    ) -> std::result::Result<HashSet<PolygonId>, TopologyError> {
        let root = self.sets.find(mv);
        if let Some(set) = self.polygons.get(&root) {
            return Ok(set.clone());
        }
        let set = store.merged_vertex_polygons(mv)?;
        self.polygons.insert(root, set.clone());
        Ok(set)
    }

    /// Checks that joining `src_a` into `dst_a` and `src_b` into `dst_b`
    /// never puts two corners of one polygon into a single merged vertex.
    fn can_join(
        &mut self,
        store: &TopologyStore,
        (src_a, dst_a): (MergedVertexId, MergedVertexId),
        (src_b, dst_b): (MergedVertexId, MergedVertexId),
    ) -> std::result::Result<bool, TopologyError> {
        let roots = [
            self.sets.find(src_a),
            self.sets.find(dst_a),
            self.sets.find(src_b),
            self.sets.find(dst_b),
        ];
        let sets = [
            self.polygons_of(store, src_a)?,
            self.polygons_of(store, dst_a)?,
            self.polygons_of(store, src_b)?,
            self.polygons_of(store, dst_b)?,
        ];
        let first_joined = roots[0] != roots[1];
        if first_joined && !sets[0].is_disjoint(&sets[1]) {
            return Ok(false);
        }
        // fold the first join into the second check
        let canon = |r: MergedVertexId| if r == roots[0] { roots[1] } else { r };
        let (rb_src, rb_dst) = (canon(roots[2]), canon(roots[3]));
        if rb_src == rb_dst {
            return Ok(true);
        }
        let widen = |i: usize| -> HashSet<PolygonId> {
            if first_joined && (roots[i] == roots[0] || roots[i] == roots[1]) {
                sets[0].union(&sets[1]).copied().collect()
            } else {
                sets[i].clone()
            }
        };
        Ok(widen(2).is_disjoint(&widen(3)))
    }

    fn join(
        &mut self,
        store: &TopologyStore,
        src: MergedVertexId,
        dst: MergedVertexId,
    ) -> std::result::Result<(), TopologyError> {
        let mut union = self.polygons_of(store, src)?;
        union.extend(self.polygons_of(store, dst)?);
        if self.sets.absorb(src, dst) {
            let root = self.sets.find(dst);
            self.polygons.insert(root, union);
        }
        Ok(())
    }
}

impl MergeEdges {
    /// Creates a new `MergeEdges` operation welding `source` onto `dest`.
    #[must_use]
    pub fn new(source: MergedEdgeId, dest: MergedEdgeId) -> Self {
        Self { source, dest }
    }

    /// Executes the merge.
    ///
    /// Returns [`EditOutcome::UNCHANGED`] when either edge is not a border
    /// edge, the two are the same edge, the destination lies inside the
    /// selected source run, or no pair can be welded.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn execute<H: EditHost + ?Sized>(
        &self,
        store: &mut TopologyStore,
        host: &mut H,
        selection: &Selection,
    ) -> Result<EditOutcome> {
        let (Some(src), Some(dst)) = (
            border_member(store, self.source)?,
            border_member(store, self.dest)?,
        ) else {
            debug!("merge needs two border edges");
            return Ok(EditOutcome::UNCHANGED);
        };
        if src == dst {
            return Ok(EditOutcome::UNCHANGED);
        }
        let Some(candidates) = match_segments(store, src, dst, &selection.edges)? else {
            return Ok(EditOutcome::UNCHANGED);
        };

        let mut welds = Welds::new();
        let mut pairs: Vec<(EdgeId, EdgeId)> = Vec::new();
        for (s, d) in candidates {
            if accept(store, &mut welds, s, d)? {
                pairs.push((s, d));
            } else {
                debug!(?s, ?d, "pair would weld corners of one polygon");
            }
        }
        if pairs.is_empty() {
            return Ok(EditOutcome::UNCHANGED);
        }
        extend_ends(store, &mut welds, &mut pairs)?;

        host.snapshot_for_undo(store);
        let selection_changed = commit(store, host, selection, &mut welds, &pairs)?;

        info!(pairs = pairs.len(), "merged border edges");
        debug_assert!(store.validate().is_ok());
        Ok(EditOutcome {
            changed: true,
            selection_changed,
        })
    }
}

/// Records the welds of pair `s: a → b`, `d: c → e` (`a` onto `e`, `b`
/// onto `c`) if they keep every polygon's corners apart.
fn accept(
    store: &TopologyStore,
    welds: &mut Welds,
    s: EdgeId,
    d: EdgeId,
) -> Result<bool> {
    if store.edge(s)?.polygon == store.edge(d)?.polygon {
        return Ok(false);
    }
    let (a, b) = store.merged_ends(s)?;
    let (c, e) = store.merged_ends(d)?;
    if !welds.can_join(store, (a, e), (b, c))? {
        return Ok(false);
    }
    welds.join(store, a, e)?;
    welds.join(store, b, c)?;
    Ok(true)
}

/// Zips one more link past each end of the paired run when the next
/// border edges on both sides already lead to the same point.
fn extend_ends(
    store: &TopologyStore,
    welds: &mut Welds,
    pairs: &mut Vec<(EdgeId, EdgeId)>,
) -> Result<()> {
    let mut taken: HashSet<EdgeId> = pairs.iter().flat_map(|&(s, d)| [s, d]).collect();
    let ends = [
        pairs.last().copied().map(|(s, d)| (s, d, true)),
        pairs.first().copied().map(|(s, d)| (s, d, false)),
    ];
    for (s, d, ahead) in ends.into_iter().flatten() {
        let (sn, dn) = if ahead {
            (store.next_border_edge(s)?, store.prev_border_edge(d)?)
        } else {
            (store.prev_border_edge(s)?, store.next_border_edge(d)?)
        };
        let (Some(sn), Some(dn)) = (sn, dn) else {
            continue;
        };
        if sn == dn || taken.contains(&sn) || taken.contains(&dn) {
            continue;
        }
        if store.edge(sn)?.polygon == store.edge(dn)?.polygon {
            continue;
        }
        let (sn_tail, sn_head) = store.merged_ends(sn)?;
        let (dn_tail, dn_head) = store.merged_ends(dn)?;
        let closes = welds.sets.same(sn_tail, dn_head) && welds.sets.same(sn_head, dn_tail);
        if closes {
            debug!(?sn, ?dn, "extending zipper past segment end");
            taken.insert(sn);
            taken.insert(dn);
            if ahead {
                pairs.push((sn, dn));
            } else {
                pairs.insert(0, (sn, dn));
            }
        }
    }
    Ok(())
}

/// Applies the planned edge folds and vertex welds. Returns whether a
/// selection update was sent.
fn commit<H: EditHost + ?Sized>(
    store: &mut TopologyStore,
    host: &mut H,
    selection: &Selection,
    welds: &mut Welds,
    pairs: &[(EdgeId, EdgeId)],
) -> Result<bool> {
    let mut edges_added = Vec::new();
    let mut edges_removed = Vec::new();
    for &(s, d) in pairs {
        let target = store.merged_edge_of(d)?;
        if let Some(gone) = store.weld_edge(s, target)? {
            if selection.edges.contains(&gone) {
                edges_removed.push(gone);
                if !selection.edges.contains(&target) && !edges_added.contains(&target) {
                    edges_added.push(target);
                }
            }
        }
    }

    let mut members: Vec<MergedVertexId> = Vec::new();
    for &(s, d) in pairs {
        let (a, b) = store.merged_ends(s)?;
        let (c, e) = store.merged_ends(d)?;
        for mv in [a, b, c, e] {
            if !members.contains(&mv) {
                members.push(mv);
            }
        }
    }

    let mut vertices_added = Vec::new();
    let mut vertices_removed = Vec::new();
    let mut roots: Vec<MergedVertexId> = Vec::new();
    for group in welds.sets.groups(members) {
        let Some(&any) = group.first() else {
            continue;
        };
        let root = welds.sets.find(any);
        if group.len() < 2 {
            continue;
        }
        roots.push(root);

        let single_smooth = group
            .iter()
            .map(|&mv| single_normal_group(store, mv))
            .collect::<std::result::Result<Vec<_>, TopologyError>>()?;
        let smooth_group = if single_smooth.iter().all(Option::is_some) {
            single_smooth.iter().flatten().copied().next()
        } else {
            None
        };

        let position = store.merged_vertex_position(root)?;
        let any_selected = group.iter().any(|mv| selection.vertices.contains(mv));
        for &mv in &group {
            if mv == root {
                continue;
            }
            let verts = store.merged_vertex(mv)?.verts.clone();
            for v in verts {
                store.vertex_mut(v)?.position = position;
                store.weld_vertex(v, root)?;
                if let Some(keep) = smooth_group {
                    store.share_normal(v, keep)?;
                }
            }
            if selection.vertices.contains(&mv) {
                vertices_removed.push(mv);
            }
        }
        if let Some(keep) = smooth_group {
            for v in store.merged_vertex(root)?.verts.clone() {
                store.share_normal(v, keep)?;
            }
        }
        if any_selected && !selection.vertices.contains(&root) {
            vertices_added.push(root);
        }
    }

    let polygons = polygons_around(store, &roots)?;
    for &p in &polygons {
        store.refresh_polygon(p)?;
    }
    let groups = groups_of_polygons(store, &polygons)?;
    refresh_group_normals(store, groups)?;

    let mut changed = false;
    if !vertices_added.is_empty() || !vertices_removed.is_empty() {
        host.update_selection(SelectionUpdate::Vertices {
            added: vertices_added,
            removed: vertices_removed,
        });
        changed = true;
    }
    if !edges_added.is_empty() || !edges_removed.is_empty() {
        host.update_selection(SelectionUpdate::Edges {
            added: edges_added,
            removed: edges_removed,
        });
        changed = true;
    }
    Ok(changed)
}

/// The normal group of a merged vertex whose corners all share one normal.
fn single_normal_group(
    store: &TopologyStore,
    mv: MergedVertexId,
) -> std::result::Result<Option<crate::topology::NormalGroupId>, TopologyError> {
    let mut shared = None;
    for &v in &store.merged_vertex(mv)?.verts {
        let g = store.normal_group_of(v)?;
        match shared {
            None => shared = Some(g),
            Some(s) if s != g => return Ok(None),
            Some(_) => {}
        }
    }
    Ok(shared)
}
