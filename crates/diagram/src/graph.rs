//! Graph store owning the vertex and edge sets.
//!
//! Provides the mutation primitives the document layer composes into
//! recorded operations, plus the restore primitives undo needs to bring
//! entities back under their original ids. Uniqueness and non-self-loop
//! invariants are enforced here; crossing rejection lives in [`crate::planarity`]
//! and is applied by the document layer so that edge splitting can bypass it.

use glam::DVec2;

use crate::types::{Bounds, Edge, EditError, Vertex, VertexId};

/// Result of merging one vertex into another.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The vertex that was removed
    pub removed: Vertex,
    /// Edges dropped because the redirect made them self-loops or duplicates
    pub dropped_edges: Vec<Edge>,
    /// Edges whose endpoint was redirected, as (before, after) pairs
    pub redirected_edges: Vec<(Edge, Edge)>,
}

/// Result of splitting an edge around a newly minted vertex.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// The edge that was replaced
    pub replaced: Edge,
    /// The new vertex at the split position
    pub vertex: Vertex,
    /// The two replacement edges
    pub halves: [Edge; 2],
}

/// Owner of the vertex and edge sets.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    next_vertex_id: u32,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Get vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.id == id)
    }

    /// Get a vertex position by id
    pub fn position(&self, id: VertexId) -> Option<DVec2> {
        self.vertex(id).map(|v| v.position)
    }

    /// Check whether an edge joins the given unordered pair
    pub fn has_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.edges.iter().any(|e| e.joins(a, b))
    }

    /// Get the stored edge joining the given unordered pair
    pub fn edge(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.joins(a, b))
    }

    /// All edges incident to a vertex
    pub fn edges_at(&self, id: VertexId) -> Vec<Edge> {
        self.edges.iter().filter(|e| e.touches(id)).copied().collect()
    }

    /// The next id that will be minted
    pub fn next_vertex_id(&self) -> u32 {
        self.next_vertex_id
    }

    /// Axis-aligned bounds of the given vertices (missing ids are skipped)
    pub fn bounds_of(&self, ids: &[VertexId]) -> Option<Bounds> {
        Bounds::from_points(ids.iter().filter_map(|id| self.position(*id)))
    }

    // ========================================================================
    // Mutation primitives
    // ========================================================================

    /// Add a vertex at the given position, minting a fresh id
    pub fn add_vertex(&mut self, position: DVec2) -> Vertex {
        self.next_vertex_id += 1;
        let vertex = Vertex {
            id: VertexId(self.next_vertex_id),
            position,
        };
        self.vertices.push(vertex);
        vertex
    }

    /// Re-insert a vertex under its original id (undo/redo restore path)
    pub fn insert_vertex(&mut self, vertex: Vertex) {
        if self.vertex(vertex.id).is_none() {
            self.vertices.push(vertex);
        }
    }

    /// Move a vertex, returning its prior position
    pub fn move_vertex(&mut self, id: VertexId, to: DVec2) -> Result<DVec2, EditError> {
        let vertex = self
            .vertices
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(EditError::UnknownVertex(id))?;
        let prior = vertex.position;
        vertex.position = to;
        Ok(prior)
    }

    /// Remove a vertex and every incident edge
    ///
    /// Returns the removed vertex and edges; `None` if the id is unknown.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<(Vertex, Vec<Edge>)> {
        let index = self.vertices.iter().position(|v| v.id == id)?;
        let vertex = self.vertices.remove(index);

        let mut removed_edges = Vec::new();
        self.edges.retain(|e| {
            if e.touches(id) {
                removed_edges.push(*e);
                false
            } else {
                true
            }
        });

        Some((vertex, removed_edges))
    }

    /// Add an edge between two existing vertices
    ///
    /// Rejects self-loops and duplicates. Crossing rejection is the caller's
    /// responsibility via the planarity guard.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<Edge, EditError> {
        if a == b {
            return Err(EditError::SelfLoop);
        }
        for id in [a, b] {
            if self.vertex(id).is_none() {
                return Err(EditError::UnknownVertex(id));
            }
        }
        if self.has_edge(a, b) {
            return Err(EditError::DuplicateEdge);
        }

        let edge = Edge::new(a, b);
        self.edges.push(edge);
        Ok(edge)
    }

    /// Re-insert an edge verbatim (undo/redo restore path)
    pub fn insert_edge(&mut self, edge: Edge) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Remove the edge joining the given pair, returning it
    pub fn remove_edge(&mut self, a: VertexId, b: VertexId) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.joins(a, b))?;
        Some(self.edges.remove(index))
    }

    /// Merge `remove` into `keep`: redirect incident edges, dropping any that
    /// become self-loops or duplicates, then delete `remove`.
    pub fn merge_vertices(
        &mut self,
        keep: VertexId,
        remove: VertexId,
    ) -> Result<MergeOutcome, EditError> {
        if keep == remove {
            return Err(EditError::SelfLoop);
        }
        for id in [keep, remove] {
            if self.vertex(id).is_none() {
                return Err(EditError::UnknownVertex(id));
            }
        }

        let mut dropped_edges = Vec::new();
        let mut redirected_edges = Vec::new();
        let mut kept_edges: Vec<Edge> = Vec::with_capacity(self.edges.len());

        for edge in &self.edges {
            if !edge.touches(remove) {
                kept_edges.push(*edge);
                continue;
            }

            let redirected = Edge::new(
                if edge.a == remove { keep } else { edge.a },
                if edge.b == remove { keep } else { edge.b },
            );

            // Self-loop after redirect, or a duplicate of an edge that is
            // already present (kept or yet to be redirected to the same pair).
            let duplicate = kept_edges.contains(&redirected)
                || self
                    .edges
                    .iter()
                    .any(|e| *e != *edge && !e.touches(remove) && *e == redirected);
            if redirected.a == redirected.b || duplicate {
                dropped_edges.push(*edge);
                continue;
            }

            redirected_edges.push((*edge, redirected));
            kept_edges.push(redirected);
        }

        self.edges = kept_edges;

        let index = self
            .vertices
            .iter()
            .position(|v| v.id == remove)
            .expect("merge source vanished mid-operation");
        let removed = self.vertices.remove(index);

        Ok(MergeOutcome {
            removed,
            dropped_edges,
            redirected_edges,
        })
    }

    /// Replace one edge with two halves around a newly minted vertex at `at`.
    pub fn split_edge(&mut self, a: VertexId, b: VertexId, at: DVec2) -> Result<SplitOutcome, EditError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.joins(a, b))
            .ok_or(EditError::NoSplitTarget)?;
        let replaced = self.edges.remove(index);

        let vertex = self.add_vertex(at);
        let halves = [
            Edge::new(replaced.a, vertex.id),
            Edge::new(vertex.id, replaced.b),
        ];
        self.edges.extend_from_slice(&halves);

        Ok(SplitOutcome {
            replaced,
            vertex,
            halves,
        })
    }

    // ========================================================================
    // Bulk state (clear-all, import, undo restore)
    // ========================================================================

    /// Drop every vertex and edge; the id counter is left untouched so ids
    /// are never reused across a clear.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
    }

    /// Replace the entire graph state verbatim
    pub fn restore(&mut self, vertices: Vec<Vertex>, edges: Vec<Edge>, next_vertex_id: u32) {
        self.vertices = vertices;
        self.edges = edges;
        self.next_vertex_id = next_vertex_id;
    }

    /// Replace the edge set verbatim (merge undo/redo)
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (GraphStore, VertexId, VertexId, VertexId) {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::new(0.0, 0.0)).id;
        let b = graph.add_vertex(DVec2::new(10.0, 0.0)).id;
        let c = graph.add_vertex(DVec2::new(0.0, 10.0)).id;
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c).unwrap();
        graph.add_edge(c, a).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn test_vertex_ids_monotonic() {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::ZERO).id;
        let b = graph.add_vertex(DVec2::ZERO).id;
        graph.remove_vertex(b);
        let c = graph.add_vertex(DVec2::ZERO).id;
        assert!(a < b && b < c, "ids must never be reused");
    }

    #[test]
    fn test_add_edge_rejections() {
        let (mut graph, a, b, _) = triangle();
        assert_eq!(graph.add_edge(a, a), Err(EditError::SelfLoop));
        assert_eq!(graph.add_edge(a, b), Err(EditError::DuplicateEdge));
        assert_eq!(graph.add_edge(b, a), Err(EditError::DuplicateEdge));
        assert_eq!(
            graph.add_edge(a, VertexId(99)),
            Err(EditError::UnknownVertex(VertexId(99)))
        );
    }

    #[test]
    fn test_remove_vertex_cascades_edges() {
        let (mut graph, a, b, c) = triangle();
        let (vertex, removed_edges) = graph.remove_vertex(a).unwrap();
        assert_eq!(vertex.id, a);
        assert_eq!(removed_edges.len(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(b, c));
    }

    #[test]
    fn test_move_vertex_returns_prior() {
        let (mut graph, a, _, _) = triangle();
        let prior = graph.move_vertex(a, DVec2::new(5.0, 5.0)).unwrap();
        assert_eq!(prior, DVec2::new(0.0, 0.0));
        assert_eq!(graph.position(a), Some(DVec2::new(5.0, 5.0)));
        assert!(graph.move_vertex(VertexId(99), DVec2::ZERO).is_err());
    }

    #[test]
    fn test_merge_drops_connecting_edge() {
        // Merging b into a where edge a-b exists: the edge becomes a
        // self-loop and is dropped, not rewritten.
        let (mut graph, a, b, c) = triangle();
        let outcome = graph.merge_vertices(a, b).unwrap();

        assert_eq!(outcome.removed.id, b);
        assert!(outcome.dropped_edges.contains(&Edge::new(a, b)));
        // b-c redirects to a-c, which duplicates the surviving c-a edge.
        assert!(outcome.dropped_edges.contains(&Edge::new(b, c)));
        assert!(outcome.redirected_edges.is_empty());
        assert!(graph.vertex(b).is_none());
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(a, c));
    }

    #[test]
    fn test_merge_redirects_unrelated_edges() {
        let mut graph = GraphStore::new();
        let a = graph.add_vertex(DVec2::new(0.0, 0.0)).id;
        let b = graph.add_vertex(DVec2::new(10.0, 0.0)).id;
        let c = graph.add_vertex(DVec2::new(20.0, 0.0)).id;
        graph.add_edge(b, c).unwrap();

        let outcome = graph.merge_vertices(a, b).unwrap();
        assert!(outcome.dropped_edges.is_empty());
        assert_eq!(outcome.redirected_edges.len(), 1);
        assert!(graph.has_edge(a, c));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_split_edge() {
        let (mut graph, a, b, _) = triangle();
        let outcome = graph.split_edge(a, b, DVec2::new(5.0, 0.0)).unwrap();

        let v = outcome.vertex.id;
        assert_eq!(outcome.replaced, Edge::new(a, b));
        assert!(!graph.has_edge(a, b));
        assert!(graph.has_edge(a, v));
        assert!(graph.has_edge(v, b));
        assert_eq!(graph.position(v), Some(DVec2::new(5.0, 0.0)));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_clear_keeps_id_counter() {
        let (mut graph, _, _, _) = triangle();
        let next_before = graph.next_vertex_id();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.next_vertex_id(), next_before);
        let v = graph.add_vertex(DVec2::ZERO);
        assert_eq!(v.id, VertexId(next_before + 1));
    }
}
