//! Planarity guard: rejection of edges that would cross the embedding.
//!
//! Applied when an edge is created; vertex moves are not re-validated, so a
//! drag may transiently produce crossings. Edge splitting bypasses the guard
//! because it only subdivides an edge that is already part of the embedding.

use glam::DVec2;

use crate::geometry::segments_intersect;
use crate::graph::GraphStore;
use crate::types::{Edge, VertexId};

/// First existing edge a candidate edge `a-b` would properly cross.
///
/// Edges sharing an endpoint *by identity* with the candidate are skipped;
/// meeting a neighbor at the common vertex is not a crossing.
pub fn crossing_edge(graph: &GraphStore, a: VertexId, b: VertexId) -> Option<Edge> {
    let pa = graph.position(a)?;
    let pb = graph.position(b)?;
    graph
        .edges()
        .iter()
        .find(|edge| !edge.touches(a) && !edge.touches(b) && crosses(graph, pa, pb, edge))
        .copied()
}

/// First existing edge the segment `from-to` would properly cross, ignoring
/// `skip` and any edge incident to `anchor`. Used for drag-created edges
/// whose far endpoint does not exist as a vertex yet.
pub fn crossing_edge_for_segment(
    graph: &GraphStore,
    anchor: VertexId,
    from: DVec2,
    to: DVec2,
    skip: Option<Edge>,
) -> Option<Edge> {
    graph
        .edges()
        .iter()
        .find(|edge| {
            Some(**edge) != skip && !edge.touches(anchor) && crosses(graph, from, to, edge)
        })
        .copied()
}

fn crosses(graph: &GraphStore, from: DVec2, to: DVec2, edge: &Edge) -> bool {
    let (Some(p3), Some(p4)) = (graph.position(edge.a), graph.position(edge.b)) else {
        return false;
    };
    segments_intersect(from, to, p3, p4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_edge_detected() {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::new(0.0, 0.0)).id;
        let b = graph.add_vertex(DVec2::new(10.0, 10.0)).id;
        let c = graph.add_vertex(DVec2::new(0.0, 10.0)).id;
        let d = graph.add_vertex(DVec2::new(10.0, 0.0)).id;
        graph.add_edge(a, b).unwrap();

        assert_eq!(crossing_edge(&graph, c, d), Some(Edge::new(a, b)));
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::new(0.0, 0.0)).id;
        let b = graph.add_vertex(DVec2::new(10.0, 0.0)).id;
        let c = graph.add_vertex(DVec2::new(5.0, 10.0)).id;
        graph.add_edge(a, b).unwrap();

        assert_eq!(crossing_edge(&graph, a, c), None);
        assert_eq!(crossing_edge(&graph, b, c), None);
    }

    #[test]
    fn test_segment_guard_skips_split_target() {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::new(0.0, 0.0)).id;
        let b = graph.add_vertex(DVec2::new(10.0, 0.0)).id;
        let s = graph.add_vertex(DVec2::new(5.0, 10.0)).id;
        let edge = graph.add_edge(a, b).unwrap();

        // Dropping a connection from s onto the body of a-b crosses only
        // the edge being split, which is excluded.
        let target = DVec2::new(5.0, 0.0);
        let from = graph.position(s).unwrap();
        assert_eq!(
            crossing_edge_for_segment(&graph, s, from, target, Some(edge)),
            None
        );
    }
}
