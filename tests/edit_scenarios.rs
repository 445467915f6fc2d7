//! Editing scenarios across the weldmesh operations.
//!
//! Every scenario builds its fixture with `MakeMesh`, runs one or more
//! operations, and checks both the expected counts and that the store is
//! still valid afterwards.

#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;

use weldmesh::math::Point3;
use weldmesh::operations::border::{BorderLoops, FixBorder};
use weldmesh::operations::bridge::BridgeEdges;
use weldmesh::operations::creation::{MakeMesh, NormalMode};
use weldmesh::operations::merge::MergeEdges;
use weldmesh::operations::modification::DetachRegion;
use weldmesh::operations::query::{BorderEdges, Islands};
use weldmesh::operations::smooth::{SharpenNormals, SmoothNormals};
use weldmesh::operations::split::SplitEdges;
use weldmesh::operations::EditOutcome;
use weldmesh::topology::{MergedEdgeId, PolygonId, VertexId};
use weldmesh::{EditConfig, RecordingHost, Selection, StoreFactory, TopologyStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

/// `n` x `n` grid of unit quads.
fn grid(store: &mut TopologyStore, n: usize, normals: NormalMode) -> Vec<PolygonId> {
    let mut positions = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            positions.push(p(i as f64, j as f64));
        }
    }
    let mut faces = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let a = j * (n + 1) + i;
            faces.push(vec![a, a + 1, a + n + 2, a + n + 1]);
        }
    }
    MakeMesh::new(positions, faces, normals)
        .execute(store, &mut StoreFactory)
        .unwrap()
}

fn border_between(store: &TopologyStore, from: Point3, to: Point3) -> MergedEdgeId {
    store
        .edge_ids()
        .find(|&e| {
            let d = store.edge(e).unwrap();
            store.is_border(e).unwrap()
                && store.vertex(d.tail).unwrap().position == from
                && store.vertex(d.head).unwrap().position == to
        })
        .map(|e| store.merged_edge_of(e).unwrap())
        .unwrap()
}

fn interior_count(store: &TopologyStore) -> usize {
    store
        .merged_edge_ids()
        .filter(|&m| !store.merged_edge(m).unwrap().is_border())
        .count()
}

// =============================================================================
// Border loops
// =============================================================================

mod border_loops {
    use super::*;

    #[test]
    fn loop_sizes_add_up_to_the_border() {
        init_tracing();
        let mut store = TopologyStore::new();
        let polys = grid(&mut store, 4, NormalMode::Smooth);
        let loops = BorderLoops::new(polys).execute(&store).unwrap();
        let border = BorderEdges::new().execute(&store).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 16);
        assert_eq!(loops.iter().map(|l| l.len()).sum::<usize>(), border.len());
    }

    #[test]
    fn branch_vertex_splits_once_per_pass() {
        init_tracing();
        let mut store = TopologyStore::new();
        // strip of four triangles whose ends touch at position 0
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.5),
        ];
        let faces = vec![vec![0, 1, 2], vec![2, 1, 3], vec![2, 3, 4], vec![4, 3, 0]];
        let polys = MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(&mut store, &mut StoreFactory)
            .unwrap();
        let loops = BorderLoops::new(polys).execute(&store).unwrap();
        let split = &loops[0].splits[0];
        let passes = store.wedges(split.merged_vertex, |_| Ok(false)).unwrap().len();
        let members_before: HashSet<VertexId> = store
            .merged_vertex(split.merged_vertex)
            .unwrap()
            .verts
            .iter()
            .copied()
            .collect();

        let created = FixBorder::new(loops[0].edges.clone())
            .execute(&mut store, &mut StoreFactory, &mut RecordingHost::new())
            .unwrap();

        assert_eq!(created.len(), passes);
        let members_after: Vec<VertexId> = created
            .iter()
            .flat_map(|&m| store.merged_vertex(m).unwrap().verts.clone())
            .collect();
        assert_eq!(members_after.len(), members_before.len());
        assert_eq!(members_after.into_iter().collect::<HashSet<_>>(), members_before);
        store.validate().unwrap();
    }
}

// =============================================================================
// Bridging
// =============================================================================

mod bridging {
    use super::*;

    #[test]
    fn eight_edge_loop_bridged_in_two_segments() {
        init_tracing();
        let mut store = TopologyStore::new();
        grid(&mut store, 2, NormalMode::Smooth);
        let e3 = border_between(&store, p(2.0, 1.0), p(2.0, 2.0));
        let e7 = border_between(&store, p(0.0, 1.0), p(0.0, 0.0));
        let merged_before = store.num_merged_vertices();
        let interior_before = interior_count(&store);
        let config = EditConfig {
            bridge_segments: 2,
            ..EditConfig::default()
        };
        let mut host = RecordingHost::new();

        let built = BridgeEdges::new(e3, e7)
            .execute(&mut store, &mut StoreFactory, &mut host, &Selection::new(), &config)
            .unwrap();

        assert!(built);
        assert_eq!(host.committed.len(), 2);
        let triangles: usize = host
            .committed
            .iter()
            .map(|&q| store.polygon(q).unwrap().triangles.len())
            .sum();
        assert_eq!(triangles, 4);
        assert_eq!(store.num_merged_vertices(), merged_before + 2);
        // e3, e7 and the seam between the two strips
        assert_eq!(interior_count(&store), interior_before + 3);
        store.validate().unwrap();
    }

    #[test]
    fn selected_run_gives_one_polygon_per_pair() {
        init_tracing();
        let mut store = TopologyStore::new();
        // two strips of three quads with a gap between them
        let mut positions = Vec::new();
        for y in [0.0, 1.0, 2.0, 3.0] {
            for x in 0..4 {
                positions.push(p(f64::from(x), y));
            }
        }
        let mut faces = Vec::new();
        for row in [0usize, 2] {
            for i in 0..3 {
                let a = row * 4 + i;
                faces.push(vec![a, a + 1, a + 5, a + 4]);
            }
        }
        MakeMesh::new(positions, faces, NormalMode::Smooth)
            .execute(&mut store, &mut StoreFactory)
            .unwrap();
        let run: Vec<MergedEdgeId> = (0..3)
            .map(|i| border_between(&store, p(f64::from(3 - i), 1.0), p(f64::from(2 - i), 1.0)))
            .collect();
        let dest = border_between(&store, p(1.0, 2.0), p(2.0, 2.0));
        let selection = Selection::with_edges(run.clone());
        let mut host = RecordingHost::new();

        BridgeEdges::new(run[1], dest)
            .execute(&mut store, &mut StoreFactory, &mut host, &selection, &EditConfig::default())
            .unwrap();

        assert_eq!(host.committed.len(), 3);
        assert!(run.iter().all(|&m| store.merged_edge(m).unwrap().edges.len() == 2));
        assert_eq!(Islands::new().execute(&store).unwrap().len(), 1);
        store.validate().unwrap();
    }
}

// =============================================================================
// Merging
// =============================================================================

mod merging {
    use super::*;

    #[test]
    fn corners_of_one_polygon_are_never_welded() {
        init_tracing();
        let mut store = TopologyStore::new();
        let polys = grid(&mut store, 1, NormalMode::Smooth);
        let bottom = border_between(&store, p(0.0, 0.0), p(1.0, 0.0));
        let top = border_between(&store, p(1.0, 1.0), p(0.0, 1.0));
        let before = store.clone();

        let outcome = MergeEdges::new(bottom, top)
            .execute(&mut store, &mut RecordingHost::new(), &Selection::new())
            .unwrap();

        assert_eq!(outcome, EditOutcome::UNCHANGED);
        assert_eq!(store.num_merged_vertices(), before.num_merged_vertices());
        assert_eq!(store.num_merged_edges(), before.num_merged_edges());
        assert_eq!(store.polygon(polys[0]).unwrap().verts.len(), 4);
    }

    #[test]
    fn slit_from_the_border_zips_back_in() {
        init_tracing();
        let mut store = TopologyStore::new();
        grid(&mut store, 2, NormalMode::Smooth);
        let merged_vertices = store.num_merged_vertices();
        let merged_edges = store.num_merged_edges();
        let shared = store
            .edge_ids()
            .find(|&e| {
                let d = store.edge(e).unwrap();
                store.vertex(d.tail).unwrap().position == p(1.0, 0.0)
                    && store.vertex(d.head).unwrap().position == p(1.0, 1.0)
            })
            .map(|e| store.merged_edge_of(e).unwrap())
            .unwrap();

        let split = SplitEdges::new(vec![shared])
            .execute(
                &mut store,
                &mut StoreFactory,
                &mut RecordingHost::new(),
                &Selection::new(),
                &EditConfig::default(),
            )
            .unwrap();
        assert!(split);
        assert_eq!(store.num_merged_vertices(), merged_vertices + 1);
        assert_eq!(store.num_merged_edges(), merged_edges + 1);

        let source = border_between(&store, p(1.0, 0.0), p(1.0, 1.0));
        let dest = border_between(&store, p(1.0, 1.0), p(1.0, 0.0));
        let outcome = MergeEdges::new(source, dest)
            .execute(&mut store, &mut RecordingHost::new(), &Selection::new())
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(store.num_merged_vertices(), merged_vertices);
        assert_eq!(store.num_merged_edges(), merged_edges);
        store.validate().unwrap();
    }

    #[test]
    fn detached_region_zips_back_in() {
        init_tracing();
        let mut store = TopologyStore::new();
        let polys = grid(&mut store, 3, NormalMode::Smooth);
        let merged_vertices = store.num_merged_vertices();
        let merged_edges = store.num_merged_edges();

        let loops = DetachRegion::new(vec![polys[4]])
            .execute(
                &mut store,
                &mut StoreFactory,
                &mut RecordingHost::new(),
                &EditConfig::default(),
            )
            .unwrap();
        assert_eq!(Islands::new().execute(&store).unwrap().len(), 2);
        assert_eq!(store.num_merged_vertices(), merged_vertices + 4);

        let source = border_between(&store, p(1.0, 1.0), p(2.0, 1.0));
        let dest = border_between(&store, p(2.0, 1.0), p(1.0, 1.0));
        let selection = Selection::with_edges(loops[0].edges.clone());
        let mut host = RecordingHost::new();

        let outcome = MergeEdges::new(source, dest)
            .execute(&mut store, &mut host, &selection)
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(host.snapshots, 1);
        assert_eq!(store.num_merged_vertices(), merged_vertices);
        assert_eq!(store.num_merged_edges(), merged_edges);
        assert_eq!(Islands::new().execute(&store).unwrap().len(), 1);
        store.validate().unwrap();
    }
}

// =============================================================================
// Normals
// =============================================================================

mod normals {
    use super::*;

    fn partition(store: &TopologyStore) -> Vec<Vec<VertexId>> {
        let mut groups: Vec<Vec<VertexId>> = store
            .normal_group_ids()
            .map(|g| {
                let mut verts = store.normal_group(g).unwrap().verts.clone();
                verts.sort();
                verts
            })
            .collect();
        groups.sort();
        groups
    }

    #[test]
    fn smooth_then_sharpen_restores_flat_groups() {
        init_tracing();
        let mut store = TopologyStore::new();
        grid(&mut store, 3, NormalMode::Flat);
        // interior edges that share no merged vertex
        let mut touched = HashSet::new();
        let mut edges: Vec<MergedEdgeId> = Vec::new();
        for m in store.merged_edge_ids() {
            let data = store.merged_edge(m).unwrap();
            if data.is_border() {
                continue;
            }
            let (a, b) = store.merged_ends(data.edges[0]).unwrap();
            if !touched.contains(&a) && !touched.contains(&b) {
                touched.extend([a, b]);
                edges.push(m);
            }
        }
        assert!(edges.len() >= 3);
        let before = partition(&store);

        let smoothed = SmoothNormals::new(edges.clone())
            .execute(&mut store, &mut RecordingHost::new(), &Selection::new())
            .unwrap();
        assert!(smoothed.changed);
        store.validate().unwrap();

        let sharpened = SharpenNormals::new(edges)
            .execute(&mut store, &mut StoreFactory, &mut RecordingHost::new())
            .unwrap();
        assert!(sharpened.changed);
        assert_eq!(partition(&store), before);
        store.validate().unwrap();
    }
}
