//! Id-assigning creation of mesh records.
//!
//! Operations never insert into the store directly; every new record goes
//! through a [`GeometryFactory`] so that a host can track creations for its
//! undo log.

use crate::error::{self, TopologyError};
use crate::math::Point3;
use crate::topology::{
    EdgeData, EdgeId, MergedEdgeId, MergedVertexId, NormalGroupId, PolygonId, TopologyStore,
    VertexData, VertexId,
};

/// Creates mesh records in a [`TopologyStore`].
///
/// Every method has a default body that inserts straight into the store.
pub trait GeometryFactory {
    /// Creates a detached vertex.
    fn create_vertex(&mut self, store: &mut TopologyStore, position: Point3) -> VertexId {
        store.add_vertex(VertexData::new(position))
    }

    /// Creates a detached edge `tail → head`.
    fn create_edge(&mut self, store: &mut TopologyStore, tail: VertexId, head: VertexId) -> EdgeId {
        store.add_edge(EdgeData::new(tail, head))
    }

    /// Creates a polygon over existing vertices and edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the corners and sides do not form a polygon.
    fn create_polygon(
        &mut self,
        store: &mut TopologyStore,
        verts: Vec<VertexId>,
        edges: Vec<EdgeId>,
        triangles: Vec<[VertexId; 3]>,
    ) -> error::Result<PolygonId> {
        store.add_polygon(verts, edges, triangles)
    }

    /// Creates a merged vertex, welding `verts` into it.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the vertices is missing.
    fn create_merged_vertex(
        &mut self,
        store: &mut TopologyStore,
        verts: &[VertexId],
    ) -> Result<MergedVertexId, TopologyError> {
        store.add_merged_vertex(verts)
    }

    /// Creates a merged edge, optionally welding a first member into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    fn create_merged_edge(
        &mut self,
        store: &mut TopologyStore,
        edge: Option<EdgeId>,
    ) -> Result<MergedEdgeId, TopologyError> {
        store.add_merged_edge(edge)
    }

    /// Creates a normal group over `verts`.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the vertices is missing.
    fn create_normal_group(
        &mut self,
        store: &mut TopologyStore,
        verts: &[VertexId],
    ) -> Result<NormalGroupId, TopologyError> {
        store.add_normal_group(verts)
    }
}

/// Factory that inserts into the store and records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreFactory;

impl GeometryFactory for StoreFactory {}

/// Ids created through a [`TrackingFactory`].
#[derive(Debug, Clone, Default)]
pub struct CreatedIds {
    /// Created vertices.
    pub vertices: Vec<VertexId>,
    /// Created edges.
    pub edges: Vec<EdgeId>,
    /// Created polygons.
    pub polygons: Vec<PolygonId>,
    /// Created merged vertices.
    pub merged_vertices: Vec<MergedVertexId>,
    /// Created merged edges.
    pub merged_edges: Vec<MergedEdgeId>,
    /// Created normal groups.
    pub normal_groups: Vec<NormalGroupId>,
}

/// Factory that records every id it hands out, for undo tracking.
#[derive(Debug, Clone, Default)]
pub struct TrackingFactory {
    /// Ids handed out so far.
    pub created: CreatedIds,
}

impl TrackingFactory {
    /// Creates a factory with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record and starts a new one.
    pub fn take(&mut self) -> CreatedIds {
        std::mem::take(&mut self.created)
    }
}

impl GeometryFactory for TrackingFactory {
    fn create_vertex(&mut self, store: &mut TopologyStore, position: Point3) -> VertexId {
        let id = store.add_vertex(VertexData::new(position));
        self.created.vertices.push(id);
        id
    }

    fn create_edge(&mut self, store: &mut TopologyStore, tail: VertexId, head: VertexId) -> EdgeId {
        let id = store.add_edge(EdgeData::new(tail, head));
        self.created.edges.push(id);
        id
    }

    fn create_polygon(
        &mut self,
        store: &mut TopologyStore,
        verts: Vec<VertexId>,
        edges: Vec<EdgeId>,
        triangles: Vec<[VertexId; 3]>,
    ) -> error::Result<PolygonId> {
        let id = store.add_polygon(verts, edges, triangles)?;
        self.created.polygons.push(id);
        Ok(id)
    }

    fn create_merged_vertex(
        &mut self,
        store: &mut TopologyStore,
        verts: &[VertexId],
    ) -> Result<MergedVertexId, TopologyError> {
        let id = store.add_merged_vertex(verts)?;
        self.created.merged_vertices.push(id);
        Ok(id)
    }

    fn create_merged_edge(
        &mut self,
        store: &mut TopologyStore,
        edge: Option<EdgeId>,
    ) -> Result<MergedEdgeId, TopologyError> {
        let id = store.add_merged_edge(edge)?;
        self.created.merged_edges.push(id);
        Ok(id)
    }

    fn create_normal_group(
        &mut self,
        store: &mut TopologyStore,
        verts: &[VertexId],
    ) -> Result<NormalGroupId, TopologyError> {
        let id = store.add_normal_group(verts)?;
        self.created.normal_groups.push(id);
        Ok(id)
    }
}
