use crate::error::TopologyError;
use crate::union_find::DisjointSet;

use super::{EdgeId, MergedVertexId, TopologyStore, VertexId};

/// Corners visited while rotating around one merged vertex.
#[derive(Debug, Clone)]
pub struct Wedge {
    /// Visited corners, in rotation order.
    pub verts: Vec<VertexId>,
    /// The cut or border edge that stopped the rotation, or `None` if the
    /// rotation came back to its first corner (a closed fan).
    pub exit: Option<EdgeId>,
}

impl TopologyStore {
    /// Rotates around the head of `incoming`, crossing interior edges from
    /// each corner's outgoing side, until `is_cut` accepts an outgoing edge
    /// or a border edge is reached.
    ///
    /// Following the exit edge of a border `incoming` edge gives the next
    /// border edge of its loop.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing or the rotation does not
    /// terminate within the size of the merged vertex.
    pub fn rotate_forward<F>(&self, incoming: EdgeId, mut is_cut: F) -> Result<Wedge, TopologyError>
    where
        F: FnMut(EdgeId) -> Result<bool, TopologyError>,
    {
        let start = self.edge(incoming)?.head;
        let limit = self.merged_vertex(self.merged_vertex_of(start)?)?.verts.len();
        let mut verts = Vec::new();
        let mut v = start;
        loop {
            verts.push(v);
            let out = self.vertex(v)?.next_edge;
            if is_cut(out)? {
                return Ok(Wedge { verts, exit: Some(out) });
            }
            let Some(across) = self.partner(out)? else {
                return Ok(Wedge { verts, exit: Some(out) });
            };
            v = self.edge(across)?.head;
            if v == start {
                return Ok(Wedge { verts, exit: None });
            }
            if verts.len() > limit {
                return Err(TopologyError::InvalidTopology(
                    "forward rotation does not close around its merged vertex".into(),
                ));
            }
        }
    }

    /// Rotates around the tail of `outgoing` in the opposite direction to
    /// [`rotate_forward`](Self::rotate_forward), crossing interior edges from
    /// each corner's incoming side.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing or the rotation does not
    /// terminate within the size of the merged vertex.
    pub fn rotate_backward<F>(
        &self,
        outgoing: EdgeId,
        mut is_cut: F,
    ) -> Result<Wedge, TopologyError>
    where
        F: FnMut(EdgeId) -> Result<bool, TopologyError>,
    {
        let start = self.edge(outgoing)?.tail;
        let limit = self.merged_vertex(self.merged_vertex_of(start)?)?.verts.len();
        let mut verts = Vec::new();
        let mut v = start;
        loop {
            verts.push(v);
            let inc = self.vertex(v)?.prev_edge;
            if is_cut(inc)? {
                return Ok(Wedge { verts, exit: Some(inc) });
            }
            let Some(across) = self.partner(inc)? else {
                return Ok(Wedge { verts, exit: Some(inc) });
            };
            v = self.edge(across)?.tail;
            if v == start {
                return Ok(Wedge { verts, exit: None });
            }
            if verts.len() > limit {
                return Err(TopologyError::InvalidTopology(
                    "backward rotation does not close around its merged vertex".into(),
                ));
            }
        }
    }

    /// The border edge following `edge` along its border loop.
    ///
    /// `None` if `edge` sits inside a closed fan.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn next_border_edge(&self, edge: EdgeId) -> Result<Option<EdgeId>, TopologyError> {
        Ok(self.rotate_forward(edge, |_| Ok(false))?.exit)
    }

    /// The border edge preceding `edge` along its border loop.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn prev_border_edge(&self, edge: EdgeId) -> Result<Option<EdgeId>, TopologyError> {
        Ok(self.rotate_backward(edge, |_| Ok(false))?.exit)
    }

    /// Splits the members of a merged vertex into wedges: corners joined by
    /// interior edges that `is_cut` does not reject.
    ///
    /// `is_cut` sees each corner's outgoing edge. Wedges are returned in
    /// member order, so the wedge holding the first member comes first.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is missing.
    pub fn wedges<F>(
        &self,
        id: MergedVertexId,
        mut is_cut: F,
    ) -> Result<Vec<Vec<VertexId>>, TopologyError>
    where
        F: FnMut(EdgeId) -> Result<bool, TopologyError>,
    {
        let members = &self.merged_vertex(id)?.verts;
        let mut sets = DisjointSet::new();
        for &v in members {
            sets.insert(v);
        }
        for &v in members {
            let out = self.vertex(v)?.next_edge;
            if is_cut(out)? {
                continue;
            }
            if let Some(across) = self.partner(out)? {
                let neighbour = self.edge(across)?.head;
                if self.merged_vertex_of(neighbour)? == id {
                    sets.union(v, neighbour);
                }
            }
        }
        Ok(sets.groups(members.iter().copied()))
    }
}
