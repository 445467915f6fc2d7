use crate::error::TopologyError;

use super::TopologyStore;

fn invalid(message: String) -> TopologyError {
    TopologyError::InvalidTopology(message)
}

impl TopologyStore {
    /// Checks every structural invariant of the store.
    ///
    /// - polygon corners and sides chain in order and link back to the polygon
    /// - every vertex and edge is a member of exactly the merged record its
    ///   reverse map names, and merged records are non-empty
    /// - merged edges hold one or two members; two members belong to distinct
    ///   polygons and run between the same merged vertices in opposite order
    /// - every normal group lies inside a single merged vertex
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] describing the first
    /// violation found.
    pub fn validate(&self) -> Result<(), TopologyError> {
        self.validate_polygons()?;
        self.validate_vertex_welds()?;
        self.validate_edge_welds()?;
        self.validate_normal_groups()
    }

    fn validate_polygons(&self) -> Result<(), TopologyError> {
        for (id, polygon) in &self.polygons {
            let n = polygon.verts.len();
            if n < 3 || polygon.edges.len() != n {
                return Err(invalid(format!("polygon {id:?} has {n} corners")));
            }
            for i in 0..n {
                let v = self.vertex(polygon.verts[i])?;
                let e = self.edge(polygon.edges[i])?;
                if v.polygon != id || e.polygon != id {
                    return Err(invalid(format!("polygon {id:?} back-link broken at {i}")));
                }
                if v.next_edge != polygon.edges[i] || v.prev_edge != polygon.edges[(i + n - 1) % n]
                {
                    return Err(invalid(format!("polygon {id:?} corner {i} edge links broken")));
                }
                if e.tail != polygon.verts[i] || e.head != polygon.verts[(i + 1) % n] {
                    return Err(invalid(format!("polygon {id:?} side {i} does not chain")));
                }
            }
        }
        Ok(())
    }

    fn validate_vertex_welds(&self) -> Result<(), TopologyError> {
        for v in self.vertices.keys() {
            let m = self
                .vertex_weld
                .get(v)
                .ok_or_else(|| invalid(format!("vertex {v:?} has no merged vertex")))?;
            if !self.merged_vertex(*m)?.verts.contains(&v) {
                return Err(invalid(format!("vertex {v:?} missing from its merged vertex")));
            }
        }
        let mut members = 0;
        for (id, data) in &self.merged_vertices {
            if data.verts.is_empty() {
                return Err(invalid(format!("merged vertex {id:?} is empty")));
            }
            for &v in &data.verts {
                if self.vertex_weld.get(v) != Some(&id) {
                    return Err(invalid(format!("merged vertex {id:?} lists foreign {v:?}")));
                }
            }
            members += data.verts.len();
        }
        if members != self.vertices.len() {
            return Err(invalid("merged vertices list a vertex twice".into()));
        }
        Ok(())
    }

    fn validate_edge_welds(&self) -> Result<(), TopologyError> {
        for e in self.edges.keys() {
            let m = self
                .edge_weld
                .get(e)
                .ok_or_else(|| invalid(format!("edge {e:?} has no merged edge")))?;
            if !self.merged_edge(*m)?.edges.contains(&e) {
                return Err(invalid(format!("edge {e:?} missing from its merged edge")));
            }
        }
        let mut members = 0;
        for (id, data) in &self.merged_edges {
            match data.edges.as_slice() {
                [e] => {
                    if self.edge_weld.get(*e) != Some(&id) {
                        return Err(invalid(format!("merged edge {id:?} lists foreign {e:?}")));
                    }
                }
                [a, b] => {
                    if self.edge_weld.get(*a) != Some(&id) || self.edge_weld.get(*b) != Some(&id) {
                        return Err(invalid(format!("merged edge {id:?} lists a foreign edge")));
                    }
                    if self.edge(*a)?.polygon == self.edge(*b)?.polygon {
                        return Err(invalid(format!(
                            "merged edge {id:?} joins two sides of one polygon"
                        )));
                    }
                    let (a_tail, a_head) = self.merged_ends(*a)?;
                    let (b_tail, b_head) = self.merged_ends(*b)?;
                    if a_tail != b_head || a_head != b_tail {
                        return Err(invalid(format!(
                            "merged edge {id:?} members do not run in opposite order"
                        )));
                    }
                }
                other => {
                    return Err(invalid(format!(
                        "merged edge {id:?} has {} members",
                        other.len()
                    )));
                }
            }
            members += data.edges.len();
        }
        if members != self.edges.len() {
            return Err(invalid("merged edges list an edge twice".into()));
        }
        Ok(())
    }

    fn validate_normal_groups(&self) -> Result<(), TopologyError> {
        for v in self.vertices.keys() {
            let g = self
                .vertex_normal
                .get(v)
                .ok_or_else(|| invalid(format!("vertex {v:?} has no normal group")))?;
            if !self.normal_group(*g)?.verts.contains(&v) {
                return Err(invalid(format!("vertex {v:?} missing from its normal group")));
            }
        }
        let mut members = 0;
        for (id, data) in &self.normal_groups {
            let Some(&first) = data.verts.first() else {
                return Err(invalid(format!("normal group {id:?} is empty")));
            };
            let weld = self.merged_vertex_of(first)?;
            for &v in &data.verts {
                if self.vertex_normal.get(v) != Some(&id) {
                    return Err(invalid(format!("normal group {id:?} lists foreign {v:?}")));
                }
                if self.merged_vertex_of(v)? != weld {
                    return Err(invalid(format!(
                        "normal group {id:?} spans more than one merged vertex"
                    )));
                }
            }
            members += data.verts.len();
        }
        if members != self.vertices.len() {
            return Err(invalid("normal groups list a vertex twice".into()));
        }
        Ok(())
    }
}
