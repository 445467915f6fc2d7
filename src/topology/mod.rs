pub mod edge;
pub mod merged;
pub mod polygon;
mod validate;
pub mod vertex;
mod walk;

pub use edge::{EdgeData, EdgeId};
pub use merged::{
    MergedEdgeData, MergedEdgeId, MergedVertexData, MergedVertexId, NormalGroupData,
    NormalGroupId,
};
pub use polygon::{PolygonData, PolygonId};
pub use vertex::{VertexData, VertexId};
pub use walk::Wedge;

use std::collections::HashSet;

use crate::error::{self, OperationError, TopologyError};
use crate::math::polygon_3d::{centroid, newell_normal};
use crate::math::{Point3, Vector3};
use slotmap::{SecondaryMap, SlotMap};

/// Central arena that owns every mesh record and the three partitions over
/// them (vertex welding, edge welding, normal sharing).
///
/// Records reference each other via typed IDs (generational indices). The
/// reverse maps from vertex/edge to its merged record are kept in sync by
/// [`weld_vertex`](Self::weld_vertex), [`weld_edge`](Self::weld_edge) and
/// [`share_normal`](Self::share_normal); a merged record is dropped as soon
/// as its last member leaves.
#[derive(Debug, Default, Clone)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    polygons: SlotMap<PolygonId, PolygonData>,
    merged_vertices: SlotMap<MergedVertexId, MergedVertexData>,
    merged_edges: SlotMap<MergedEdgeId, MergedEdgeData>,
    normal_groups: SlotMap<NormalGroupId, NormalGroupData>,
    vertex_weld: SecondaryMap<VertexId, MergedVertexId>,
    edge_weld: SecondaryMap<EdgeId, MergedEdgeId>,
    vertex_normal: SecondaryMap<VertexId, NormalGroupId>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("vertex"))
    }

    /// Iterates over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges.get(id).ok_or(TopologyError::EntityNotFound("edge"))
    }

    /// Iterates over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    // --- Polygon operations ---

    /// Inserts a polygon over already-created vertices and edges.
    ///
    /// Wires every vertex's `prev_edge`/`next_edge`/`polygon` links and every
    /// edge's `polygon` link, and caches the polygon's center and normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon has fewer than 3 corners, if the edge
    /// list does not chain the corners in order, or if a referenced record
    /// is missing.
    pub fn add_polygon(
        &mut self,
        verts: Vec<VertexId>,
        edges: Vec<EdgeId>,
        triangles: Vec<[VertexId; 3]>,
    ) -> error::Result<PolygonId> {
        let n = verts.len();
        if n < 3 {
            return Err(
                OperationError::InvalidInput(format!("polygon needs 3 corners, got {n}")).into(),
            );
        }
        if edges.len() != n {
            return Err(OperationError::InvalidInput(format!(
                "polygon has {n} corners but {} sides",
                edges.len()
            ))
            .into());
        }
        for (i, &e) in edges.iter().enumerate() {
            let edge = self.edge(e)?;
            if edge.tail != verts[i] || edge.head != verts[(i + 1) % n] {
                return Err(OperationError::InvalidInput(format!(
                    "side {i} does not connect corners {i} and {}",
                    (i + 1) % n
                ))
                .into());
            }
        }
        for tri in &triangles {
            if tri.iter().any(|v| !verts.contains(v)) {
                return Err(OperationError::InvalidInput(
                    "triangle references a corner outside the polygon".into(),
                )
                .into());
            }
        }

        let points = verts
            .iter()
            .map(|&v| self.vertex(v).map(|d| d.position))
            .collect::<Result<Vec<Point3>, TopologyError>>()?;
        let id = self.polygons.insert(PolygonData {
            verts: verts.clone(),
            edges: edges.clone(),
            triangles,
            center: centroid(&points),
            normal: newell_normal(&points),
        });

        for i in 0..n {
            let vertex = self.vertex_mut(verts[i])?;
            vertex.prev_edge = edges[(i + n - 1) % n];
            vertex.next_edge = edges[i];
            vertex.polygon = id;
            if let Some(edge) = self.edges.get_mut(edges[i]) {
                edge.polygon = id;
            }
        }
        Ok(id)
    }

    /// Returns a reference to the polygon data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn polygon(&self, id: PolygonId) -> Result<&PolygonData, TopologyError> {
        self.polygons
            .get(id)
            .ok_or(TopologyError::EntityNotFound("polygon"))
    }

    /// Recomputes the cached center and normal of a polygon from its corner
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon or one of its corners is missing.
    pub fn refresh_polygon(&mut self, id: PolygonId) -> Result<(), TopologyError> {
        let points = self
            .polygon(id)?
            .verts
            .iter()
            .map(|&v| self.vertex(v).map(|d| d.position))
            .collect::<Result<Vec<Point3>, TopologyError>>()?;
        let polygon = self
            .polygons
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("polygon"))?;
        polygon.center = centroid(&points);
        polygon.normal = newell_normal(&points);
        Ok(())
    }

    /// Iterates over all polygon IDs.
    pub fn polygon_ids(&self) -> impl Iterator<Item = PolygonId> + '_ {
        self.polygons.keys()
    }

    /// Number of polygons.
    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    // --- Merged vertex operations ---

    /// Inserts a merged vertex and welds the given vertices into it.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the vertices is missing.
    pub fn add_merged_vertex(
        &mut self,
        verts: &[VertexId],
    ) -> Result<MergedVertexId, TopologyError> {
        let id = self.merged_vertices.insert(MergedVertexData::default());
        for &v in verts {
            self.weld_vertex(v, id)?;
        }
        Ok(id)
    }

    /// Returns a reference to the merged vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn merged_vertex(&self, id: MergedVertexId) -> Result<&MergedVertexData, TopologyError> {
        self.merged_vertices
            .get(id)
            .ok_or(TopologyError::EntityNotFound("merged vertex"))
    }

    /// Returns the merged vertex containing `vertex`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex has no merged vertex.
    pub fn merged_vertex_of(&self, vertex: VertexId) -> Result<MergedVertexId, TopologyError> {
        self.vertex_weld
            .get(vertex)
            .copied()
            .ok_or(TopologyError::EntityNotFound("merged vertex of vertex"))
    }

    /// Moves `vertex` into the merged vertex `target`.
    ///
    /// Returns the previous merged vertex if it was left empty and removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex or the target is missing.
    pub fn weld_vertex(
        &mut self,
        vertex: VertexId,
        target: MergedVertexId,
    ) -> Result<Option<MergedVertexId>, TopologyError> {
        self.vertex(vertex)?;
        if !self.merged_vertices.contains_key(target) {
            return Err(TopologyError::EntityNotFound("merged vertex"));
        }
        let previous = self.vertex_weld.insert(vertex, target);
        if previous == Some(target) {
            return Ok(None);
        }
        if let Some(data) = self.merged_vertices.get_mut(target) {
            data.verts.push(vertex);
        }
        Ok(previous.and_then(|old| self.detach_from_merged_vertex(old, vertex)))
    }

    fn detach_from_merged_vertex(
        &mut self,
        id: MergedVertexId,
        vertex: VertexId,
    ) -> Option<MergedVertexId> {
        let data = self.merged_vertices.get_mut(id)?;
        data.verts.retain(|&v| v != vertex);
        if data.verts.is_empty() {
            self.merged_vertices.remove(id);
            Some(id)
        } else {
            None
        }
    }

    /// Iterates over all merged vertex IDs.
    pub fn merged_vertex_ids(&self) -> impl Iterator<Item = MergedVertexId> + '_ {
        self.merged_vertices.keys()
    }

    /// Number of merged vertices.
    #[must_use]
    pub fn num_merged_vertices(&self) -> usize {
        self.merged_vertices.len()
    }

    // --- Merged edge operations ---

    /// Inserts a merged edge, optionally welding a first member into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn add_merged_edge(&mut self, edge: Option<EdgeId>) -> Result<MergedEdgeId, TopologyError> {
        let id = self.merged_edges.insert(MergedEdgeData::default());
        if let Some(e) = edge {
            self.weld_edge(e, id)?;
        }
        Ok(id)
    }

    /// Returns a reference to the merged edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn merged_edge(&self, id: MergedEdgeId) -> Result<&MergedEdgeData, TopologyError> {
        self.merged_edges
            .get(id)
            .ok_or(TopologyError::EntityNotFound("merged edge"))
    }

    /// Returns the merged edge containing `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge has no merged edge.
    pub fn merged_edge_of(&self, edge: EdgeId) -> Result<MergedEdgeId, TopologyError> {
        self.edge_weld
            .get(edge)
            .copied()
            .ok_or(TopologyError::EntityNotFound("merged edge of edge"))
    }

    /// Moves `edge` into the merged edge `target`.
    ///
    /// Returns the previous merged edge if it was left empty and removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or the target is missing.
    pub fn weld_edge(
        &mut self,
        edge: EdgeId,
        target: MergedEdgeId,
    ) -> Result<Option<MergedEdgeId>, TopologyError> {
        self.edge(edge)?;
        if !self.merged_edges.contains_key(target) {
            return Err(TopologyError::EntityNotFound("merged edge"));
        }
        let previous = self.edge_weld.insert(edge, target);
        if previous == Some(target) {
            return Ok(None);
        }
        if let Some(data) = self.merged_edges.get_mut(target) {
            data.edges.push(edge);
        }
        let Some(old) = previous else {
            return Ok(None);
        };
        let Some(data) = self.merged_edges.get_mut(old) else {
            return Ok(None);
        };
        data.edges.retain(|&e| e != edge);
        if data.edges.is_empty() {
            self.merged_edges.remove(old);
            Ok(Some(old))
        } else {
            Ok(None)
        }
    }

    /// Iterates over all merged edge IDs.
    pub fn merged_edge_ids(&self) -> impl Iterator<Item = MergedEdgeId> + '_ {
        self.merged_edges.keys()
    }

    /// Number of merged edges.
    #[must_use]
    pub fn num_merged_edges(&self) -> usize {
        self.merged_edges.len()
    }

    // --- Normal group operations ---

    /// Inserts a normal group and moves the given vertices into it.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the vertices is missing.
    pub fn add_normal_group(&mut self, verts: &[VertexId]) -> Result<NormalGroupId, TopologyError> {
        let id = self.normal_groups.insert(NormalGroupData::default());
        for &v in verts {
            self.share_normal(v, id)?;
        }
        Ok(id)
    }

    /// Returns a reference to the normal group data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn normal_group(&self, id: NormalGroupId) -> Result<&NormalGroupData, TopologyError> {
        self.normal_groups
            .get(id)
            .ok_or(TopologyError::EntityNotFound("normal group"))
    }

    /// Returns the normal group containing `vertex`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex has no normal group.
    pub fn normal_group_of(&self, vertex: VertexId) -> Result<NormalGroupId, TopologyError> {
        self.vertex_normal
            .get(vertex)
            .copied()
            .ok_or(TopologyError::EntityNotFound("normal group of vertex"))
    }

    /// Moves `vertex` into the normal group `target`.
    ///
    /// Returns the previous group if it was left empty and removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex or the target is missing.
    pub fn share_normal(
        &mut self,
        vertex: VertexId,
        target: NormalGroupId,
    ) -> Result<Option<NormalGroupId>, TopologyError> {
        self.vertex(vertex)?;
        if !self.normal_groups.contains_key(target) {
            return Err(TopologyError::EntityNotFound("normal group"));
        }
        let previous = self.vertex_normal.insert(vertex, target);
        if previous == Some(target) {
            return Ok(None);
        }
        if let Some(data) = self.normal_groups.get_mut(target) {
            data.verts.push(vertex);
        }
        let Some(old) = previous else {
            return Ok(None);
        };
        let Some(data) = self.normal_groups.get_mut(old) else {
            return Ok(None);
        };
        data.verts.retain(|&v| v != vertex);
        if data.verts.is_empty() {
            self.normal_groups.remove(old);
            Ok(Some(old))
        } else {
            Ok(None)
        }
    }

    /// Iterates over all normal group IDs.
    pub fn normal_group_ids(&self) -> impl Iterator<Item = NormalGroupId> + '_ {
        self.normal_groups.keys()
    }

    /// Number of normal groups.
    #[must_use]
    pub fn num_normal_groups(&self) -> usize {
        self.normal_groups.len()
    }

    /// Sets the shading normal of every member of a normal group.
    ///
    /// # Errors
    ///
    /// Returns an error if the group or one of its members is missing.
    pub fn set_group_normal(
        &mut self,
        group: NormalGroupId,
        normal: Vector3,
    ) -> Result<(), TopologyError> {
        let members = self.normal_group(group)?.verts.clone();
        for v in members {
            self.vertex_mut(v)?.normal = normal;
        }
        Ok(())
    }

    // --- Adjacency queries ---

    /// Returns the other side of an interior edge, or `None` for a border edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its merged edge is missing.
    pub fn partner(&self, edge: EdgeId) -> Result<Option<EdgeId>, TopologyError> {
        Ok(self.merged_edge(self.merged_edge_of(edge)?)?.partner_of(edge))
    }

    /// Returns `true` if `edge` is the only member of its merged edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its merged edge is missing.
    pub fn is_border(&self, edge: EdgeId) -> Result<bool, TopologyError> {
        Ok(self.merged_edge(self.merged_edge_of(edge)?)?.is_border())
    }

    /// Returns the merged vertices at the tail and head of `edge`.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced record is missing.
    pub fn merged_ends(
        &self,
        edge: EdgeId,
    ) -> Result<(MergedVertexId, MergedVertexId), TopologyError> {
        let data = self.edge(edge)?;
        Ok((
            self.merged_vertex_of(data.tail)?,
            self.merged_vertex_of(data.head)?,
        ))
    }

    /// Returns the polygons touching a merged vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced record is missing.
    pub fn merged_vertex_polygons(
        &self,
        id: MergedVertexId,
    ) -> Result<HashSet<PolygonId>, TopologyError> {
        self.merged_vertex(id)?
            .verts
            .iter()
            .map(|&v| self.vertex(v).map(|d| d.polygon))
            .collect()
    }

    /// Returns the position shared by the members of a merged vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged vertex is missing or empty.
    pub fn merged_vertex_position(&self, id: MergedVertexId) -> Result<Point3, TopologyError> {
        let first = self
            .merged_vertex(id)?
            .verts
            .first()
            .copied()
            .ok_or_else(|| TopologyError::InvalidTopology("empty merged vertex".into()))?;
        Ok(self.vertex(first)?.position)
    }
}
