//! Single-entity operations: vertices, edges, fills, splits, drag-connect.

use glam::DVec2;
use tracing::debug;

use crate::constants::SPLIT_DEADZONE;
use crate::events::DocumentEvent;
use crate::faces;
use crate::fills::SetFillOutcome;
use crate::geometry::closest_point_on_segment;
use crate::history::{Command, SplitRecord};
use crate::planarity;
use crate::types::{Edge, EditError, FaceKey, VertexId};

use super::{Document, DragState};

impl Document {
    // ========================================================================
    // Vertices
    // ========================================================================

    /// Add a vertex at the given position
    pub fn add_vertex(&mut self, x: f64, y: f64) -> VertexId {
        let vertex = self.graph.add_vertex(DVec2::new(x, y));
        self.emit(DocumentEvent::VertexCreated(vertex));
        self.history.record(Command::AddVertex { vertex });
        vertex.id
    }

    /// Remove a vertex, cascading to its incident edges and any fill whose
    /// boundary includes it
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<(), EditError> {
        if self.graph.vertex(id).is_none() {
            return Err(EditError::UnknownVertex(id));
        }

        let fills = self.fills.remove_for_vertex(id);
        let (vertex, edges) = self
            .graph
            .remove_vertex(id)
            .expect("vertex presence checked above");

        for fill in &fills {
            self.emit(DocumentEvent::FillRemoved(fill.clone()));
        }
        for edge in &edges {
            self.emit(DocumentEvent::EdgeRemoved(*edge));
        }
        self.emit(DocumentEvent::VertexRemoved(id));
        self.selection.retain(|s| *s != id);

        self.history.record(Command::RemoveVertex {
            vertex,
            edges,
            fills,
        });
        Ok(())
    }

    /// Move a vertex to an absolute position
    ///
    /// Fills touching the vertex follow implicitly: boundaries store ids,
    /// not coordinates. A move to the current position records nothing.
    pub fn move_vertex(&mut self, id: VertexId, x: f64, y: f64) -> Result<(), EditError> {
        let to = DVec2::new(x, y);
        let from = self.graph.move_vertex(id, to)?;
        if from == to {
            return Ok(());
        }

        let vertex = *self.graph.vertex(id).expect("vertex moved above");
        self.emit(DocumentEvent::VertexMoved(vertex));
        self.history.record(Command::MoveVertex {
            vertex: id,
            from,
            to,
        });
        Ok(())
    }

    // ========================================================================
    // Single-vertex drag lifecycle
    // ========================================================================

    /// Start dragging a vertex, remembering its original position
    pub fn begin_drag(&mut self, id: VertexId) -> Result<(), EditError> {
        let origin = self
            .graph
            .position(id)
            .ok_or(EditError::UnknownVertex(id))?;
        self.drag = Some(DragState { vertex: id, origin });
        Ok(())
    }

    /// Move the dragged vertex live; nothing is recorded until the drag ends
    pub fn drag_to(&mut self, x: f64, y: f64) -> Result<(), EditError> {
        let drag = self.drag.ok_or(EditError::NoActiveDrag)?;
        self.graph.move_vertex(drag.vertex, DVec2::new(x, y))?;
        let vertex = *self.graph.vertex(drag.vertex).expect("drag vertex present");
        self.emit(DocumentEvent::VertexMoved(vertex));
        Ok(())
    }

    /// Commit the drag: one movement command from the original position to
    /// wherever the vertex ended up, or nothing if it never moved
    pub fn end_drag(&mut self) -> Result<(), EditError> {
        let drag = self.drag.take().ok_or(EditError::NoActiveDrag)?;
        let Some(current) = self.graph.position(drag.vertex) else {
            return Ok(());
        };
        if current != drag.origin {
            self.history.record(Command::MoveVertex {
                vertex: drag.vertex,
                from: drag.origin,
                to: current,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Connect two vertices
    ///
    /// Rejected for self-loops, duplicates, and edges that would properly
    /// cross an existing edge.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<(), EditError> {
        if a == b {
            return Err(EditError::SelfLoop);
        }
        for id in [a, b] {
            if self.graph.vertex(id).is_none() {
                return Err(EditError::UnknownVertex(id));
            }
        }
        if self.graph.has_edge(a, b) {
            return Err(EditError::DuplicateEdge);
        }
        if planarity::crossing_edge(&self.graph, a, b).is_some() {
            return Err(EditError::WouldCross);
        }

        let edge = self
            .graph
            .add_edge(a, b)
            .expect("preconditions checked above");
        self.emit(DocumentEvent::EdgeCreated(edge));
        self.history.record(Command::AddEdge { edge });
        Ok(())
    }

    /// Remove the edge joining two vertices, deleting any fill whose
    /// boundary relied on it
    pub fn remove_edge(&mut self, a: VertexId, b: VertexId) -> Result<(), EditError> {
        let edge = self.graph.remove_edge(a, b).ok_or(EditError::UnknownEdge)?;
        let fills = self.fills.remove_broken(&self.graph);

        self.emit(DocumentEvent::EdgeRemoved(edge));
        for fill in &fills {
            self.emit(DocumentEvent::FillRemoved(fill.clone()));
        }

        self.history.record(Command::RemoveEdge { edge, fills });
        Ok(())
    }

    // ========================================================================
    // Fills
    // ========================================================================

    /// Fill the bounded face under the point, or recolor its existing fill
    pub fn fill_at(&mut self, x: f64, y: f64, color: &str) -> Result<(), EditError> {
        let cycle = faces::face_at(&self.graph, DVec2::new(x, y))
            .ok_or(EditError::NoFaceAtPoint)?;

        match self.fills.set_fill(&cycle, color) {
            SetFillOutcome::Created(fill) => {
                self.emit(DocumentEvent::FillCreated(fill.clone()));
                self.history.record(Command::AddFill { fill });
            }
            SetFillOutcome::Recolored {
                cycle,
                old_color,
                new_color,
            } => {
                let fill = self
                    .fills
                    .get(&FaceKey::new(&cycle))
                    .expect("recolored fill present")
                    .clone();
                self.emit(DocumentEvent::FillUpdated(fill));
                self.history.record(Command::UpdateFill {
                    cycle,
                    old_color,
                    new_color,
                });
            }
        }
        Ok(())
    }

    /// Remove the fill of the face under the point; no-op when the point is
    /// in no bounded face or the face is unfilled
    pub fn unfill_at(&mut self, x: f64, y: f64) -> bool {
        let Some(cycle) = faces::face_at(&self.graph, DVec2::new(x, y)) else {
            return false;
        };
        let Some(fill) = self.fills.remove(&FaceKey::new(&cycle)) else {
            return false;
        };

        self.emit(DocumentEvent::FillRemoved(fill.clone()));
        self.history.record(Command::RemoveFill { fill });
        true
    }

    // ========================================================================
    // Edge splitting and drag-created edges
    // ========================================================================

    /// Split the edge body nearest to the point, minting a vertex at the
    /// projection
    ///
    /// The projection must land on the body of the edge: within the hit
    /// radius, and outside the deadzone reserved near each endpoint. Fills
    /// spanning the split edge are rewritten around the new vertex, since
    /// the enclosed region is unchanged.
    pub fn split_edge_at(&mut self, x: f64, y: f64) -> Result<VertexId, EditError> {
        let point = DVec2::new(x, y);
        let (edge, projection) = self
            .edge_body_at(point, None)
            .ok_or(EditError::NoSplitTarget)?;

        let record = self.apply_split(edge, projection);
        let id = record.vertex.id;
        self.history.record(Command::SplitEdge { split: record });
        Ok(id)
    }

    /// Finish a connection drag from `source` released at the given point.
    ///
    /// Releasing over another vertex connects to it; over an edge body,
    /// splits that edge and connects to the split vertex; over empty space,
    /// mints a vertex there and connects. Everything is one command.
    pub fn drag_connect(
        &mut self,
        source: VertexId,
        x: f64,
        y: f64,
    ) -> Result<VertexId, EditError> {
        let from = self
            .graph
            .position(source)
            .ok_or(EditError::UnknownVertex(source))?;
        let point = DVec2::new(x, y);

        // Released over an existing vertex: a plain connection.
        if let Some(target) = self.vertex_at(point, Some(source)) {
            if self.graph.has_edge(source, target) {
                return Err(EditError::DuplicateEdge);
            }
            if planarity::crossing_edge(&self.graph, source, target).is_some() {
                return Err(EditError::WouldCross);
            }
            let edge = self
                .graph
                .add_edge(source, target)
                .expect("preconditions checked above");
            self.emit(DocumentEvent::EdgeCreated(edge));
            self.history.record(Command::DragConnect {
                edge,
                created: None,
                split: None,
            });
            return Ok(target);
        }

        // Released over an edge body: split it, then connect to the split
        // vertex. The split itself bypasses the guard (it only subdivides an
        // already-embedded edge); the connecting segment must not cross
        // anything else.
        if let Some((target_edge, projection)) = self.edge_body_at(point, Some(source)) {
            if planarity::crossing_edge_for_segment(
                &self.graph,
                source,
                from,
                projection,
                Some(target_edge),
            )
            .is_some()
            {
                return Err(EditError::WouldCross);
            }

            let record = self.apply_split(target_edge, projection);
            let target = record.vertex.id;
            let edge = self
                .graph
                .add_edge(source, target)
                .expect("split vertex is fresh");
            self.emit(DocumentEvent::EdgeCreated(edge));
            self.history.record(Command::DragConnect {
                edge,
                created: None,
                split: Some(record),
            });
            return Ok(target);
        }

        // Released over empty space: mint the far endpoint.
        if planarity::crossing_edge_for_segment(&self.graph, source, from, point, None).is_some()
        {
            return Err(EditError::WouldCross);
        }
        let vertex = self.graph.add_vertex(point);
        self.emit(DocumentEvent::VertexCreated(vertex));
        let edge = self
            .graph
            .add_edge(source, vertex.id)
            .expect("minted vertex is fresh");
        self.emit(DocumentEvent::EdgeCreated(edge));
        self.history.record(Command::DragConnect {
            edge,
            created: Some(vertex),
            split: None,
        });
        Ok(vertex.id)
    }

    // ========================================================================
    // Hit testing helpers
    // ========================================================================

    /// Nearest vertex within the configured hit radius, excluding `exclude`
    fn vertex_at(&self, point: DVec2, exclude: Option<VertexId>) -> Option<VertexId> {
        self.graph
            .vertices()
            .iter()
            .filter(|v| Some(v.id) != exclude)
            .map(|v| (v.id, v.position.distance(point)))
            .filter(|(_, d)| *d <= self.config.vertex_hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Nearest edge whose body the point lands on: within the hit radius and
    /// with the projection outside the endpoint deadzones. Edges incident to
    /// `exclude` are skipped (connecting a vertex onto its own edge would be
    /// degenerate).
    fn edge_body_at(
        &self,
        point: DVec2,
        exclude: Option<VertexId>,
    ) -> Option<(Edge, DVec2)> {
        let mut best: Option<(Edge, DVec2, f64)> = None;
        for edge in self.graph.edges() {
            if exclude.is_some_and(|id| edge.touches(id)) {
                continue;
            }
            let (Some(pa), Some(pb)) =
                (self.graph.position(edge.a), self.graph.position(edge.b))
            else {
                continue;
            };
            let (projection, t) = closest_point_on_segment(point, pa, pb);
            if !(SPLIT_DEADZONE..=1.0 - SPLIT_DEADZONE).contains(&t) {
                continue;
            }
            let distance = point.distance(projection);
            if distance > self.config.edge_hit_radius {
                continue;
            }
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((*edge, projection, distance));
            }
        }
        best.map(|(edge, projection, _)| (edge, projection))
    }

    /// Apply a split to the graph and registry, emitting events; shared by
    /// the split command and drag-connect.
    pub(crate) fn apply_split(&mut self, edge: Edge, at: DVec2) -> SplitRecord {
        let outcome = self
            .graph
            .split_edge(edge.a, edge.b, at)
            .expect("split target exists");
        let rewritten_fills = self
            .fills
            .apply_split(outcome.replaced.a, outcome.replaced.b, outcome.vertex.id);

        debug!(
            edge = ?outcome.replaced,
            vertex = ?outcome.vertex.id,
            rewritten = rewritten_fills.len(),
            "split edge"
        );

        self.emit(DocumentEvent::EdgeRemoved(outcome.replaced));
        self.emit(DocumentEvent::VertexCreated(outcome.vertex));
        for half in &outcome.halves {
            self.emit(DocumentEvent::EdgeCreated(*half));
        }
        for (_, after) in &rewritten_fills {
            if let Some(fill) = self.fills.get(&FaceKey::new(after)) {
                self.emit(DocumentEvent::FillUpdated(fill.clone()));
            }
        }

        SplitRecord {
            replaced: outcome.replaced,
            vertex: outcome.vertex,
            halves: outcome.halves,
            rewritten_fills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(doc: &mut Document) -> (VertexId, VertexId, VertexId) {
        let a = doc.add_vertex(0.0, 0.0);
        let b = doc.add_vertex(100.0, 0.0);
        let c = doc.add_vertex(0.0, 100.0);
        doc.add_edge(a, b).unwrap();
        doc.add_edge(b, c).unwrap();
        doc.add_edge(c, a).unwrap();
        (a, b, c)
    }

    #[test]
    fn test_remove_edge_deletes_dependent_fill_only() {
        let mut doc = Document::new();
        let (a, b, c) = triangle(&mut doc);
        // A second triangle sharing edge b-c.
        let d = doc.add_vertex(100.0, 100.0);
        doc.add_edge(b, d).unwrap();
        doc.add_edge(d, c).unwrap();

        doc.fill_at(10.0, 10.0, "#ff0000").unwrap();
        doc.fill_at(65.0, 65.0, "#00ff00").unwrap();
        assert_eq!(doc.fills().len(), 2);

        // Removing a-b only breaks the first fill.
        doc.remove_edge(a, b).unwrap();
        assert_eq!(doc.fills().len(), 1);
        assert_eq!(doc.fills()[0].color, "#00ff00");
        let _ = c;
    }

    #[test]
    fn test_drag_lifecycle_records_single_move() {
        let mut doc = Document::new();
        let v = doc.add_vertex(0.0, 0.0);
        let depth = doc.history.undo_depth();

        doc.begin_drag(v).unwrap();
        doc.drag_to(5.0, 5.0).unwrap();
        doc.drag_to(20.0, -3.0).unwrap();
        doc.end_drag().unwrap();

        assert_eq!(doc.history.undo_depth(), depth + 1);
        assert!(doc.undo());
        assert_eq!(
            doc.graph().position(v),
            Some(DVec2::new(0.0, 0.0)),
            "undo must restore the pre-drag position, not an intermediate one"
        );
        assert!(doc.redo());
        assert_eq!(doc.graph().position(v), Some(DVec2::new(20.0, -3.0)));
    }

    #[test]
    fn test_unmoved_drag_records_nothing() {
        let mut doc = Document::new();
        let v = doc.add_vertex(4.0, 4.0);
        let depth = doc.history.undo_depth();

        doc.begin_drag(v).unwrap();
        doc.drag_to(9.0, 9.0).unwrap();
        doc.drag_to(4.0, 4.0).unwrap();
        doc.end_drag().unwrap();
        assert_eq!(doc.history.undo_depth(), depth);

        assert_eq!(doc.drag_to(1.0, 1.0), Err(EditError::NoActiveDrag));
    }

    #[test]
    fn test_unfill_at_is_noop_without_fill() {
        let mut doc = Document::new();
        triangle(&mut doc);
        let depth = doc.history.undo_depth();
        assert!(!doc.unfill_at(10.0, 10.0));
        assert!(!doc.unfill_at(1000.0, 1000.0));
        assert_eq!(doc.history.undo_depth(), depth);

        doc.fill_at(10.0, 10.0, "#ff0000").unwrap();
        assert!(doc.unfill_at(10.0, 10.0));
        assert!(doc.fills().is_empty());
    }

    #[test]
    fn test_recolor_and_undo() {
        let mut doc = Document::new();
        triangle(&mut doc);
        doc.fill_at(10.0, 10.0, "#ff0000").unwrap();
        doc.fill_at(10.0, 10.0, "#00ff00").unwrap();
        assert_eq!(doc.fills().len(), 1);
        assert_eq!(doc.fills()[0].color, "#00ff00");

        assert!(doc.undo());
        assert_eq!(doc.fills()[0].color, "#ff0000");
        assert!(doc.redo());
        assert_eq!(doc.fills()[0].color, "#00ff00");
    }

    #[test]
    fn test_split_edge_at_body() {
        let mut doc = Document::new();
        let (a, b, _) = triangle(&mut doc);
        let edge_count = doc.edges().len();

        let v = doc.split_edge_at(50.0, 1.0).unwrap();
        assert_eq!(doc.graph().position(v), Some(DVec2::new(50.0, 0.0)));
        assert!(!doc.graph().has_edge(a, b));
        assert!(doc.graph().has_edge(a, v));
        assert!(doc.graph().has_edge(v, b));
        assert_eq!(doc.edges().len(), edge_count + 1);
    }

    #[test]
    fn test_split_rejected_in_endpoint_deadzone() {
        let mut doc = Document::new();
        triangle(&mut doc);
        // t = 0.05 on edge a-b: inside the deadzone.
        assert_eq!(doc.split_edge_at(5.0, 1.0), Err(EditError::NoSplitTarget));
        // Too far from any edge body.
        assert_eq!(doc.split_edge_at(50.0, 40.0), Err(EditError::NoSplitTarget));
    }

    #[test]
    fn test_split_rewrites_spanning_fill() {
        let mut doc = Document::new();
        let (a, b, c) = triangle(&mut doc);
        doc.fill_at(10.0, 10.0, "#ff0000").unwrap();
        let original_cycle = doc.fills()[0].cycle.clone();

        let v = doc.split_edge_at(50.0, 1.0).unwrap();
        let cycle = &doc.fills()[0].cycle;
        assert_eq!(cycle.len(), 4);
        assert!(cycle.contains(&v));
        // The new vertex sits between the old endpoints.
        let at = cycle.iter().position(|id| *id == v).unwrap();
        let prev = cycle[(at + cycle.len() - 1) % cycle.len()];
        let next = cycle[(at + 1) % cycle.len()];
        assert!(
            (prev == a && next == b) || (prev == b && next == a),
            "split vertex must join the endpoints of the split edge"
        );

        assert!(doc.undo());
        assert_eq!(doc.fills()[0].cycle, original_cycle);
        assert!(doc.graph().has_edge(a, b));
        assert!(doc.graph().vertex(v).is_none());
        let _ = c;
    }

    #[test]
    fn test_drag_connect_to_existing_vertex() {
        let mut doc = Document::new();
        let a = doc.add_vertex(0.0, 0.0);
        let b = doc.add_vertex(100.0, 0.0);

        // Release within the vertex hit radius of b.
        let target = doc.drag_connect(a, 103.0, 2.0).unwrap();
        assert_eq!(target, b);
        assert!(doc.graph().has_edge(a, b));
        assert_eq!(doc.drag_connect(a, 100.0, 0.0), Err(EditError::DuplicateEdge));
    }

    #[test]
    fn test_drag_connect_to_empty_space() {
        let mut doc = Document::new();
        let a = doc.add_vertex(0.0, 0.0);
        let vertex_count = doc.vertices().len();

        let target = doc.drag_connect(a, 200.0, 50.0).unwrap();
        assert_eq!(doc.vertices().len(), vertex_count + 1);
        assert_eq!(doc.graph().position(target), Some(DVec2::new(200.0, 50.0)));
        assert!(doc.graph().has_edge(a, target));

        // One undo removes both the minted vertex and the edge.
        assert!(doc.undo());
        assert_eq!(doc.vertices().len(), vertex_count);
        assert!(doc.graph().vertex(target).is_none());
        assert!(doc.edges().is_empty());
    }

    #[test]
    fn test_drag_connect_onto_edge_body_splits() {
        let mut doc = Document::new();
        let a = doc.add_vertex(0.0, 0.0);
        let b = doc.add_vertex(100.0, 0.0);
        doc.add_edge(a, b).unwrap();
        let s = doc.add_vertex(50.0, 80.0);

        let target = doc.drag_connect(s, 50.0, 2.0).unwrap();
        assert_eq!(doc.graph().position(target), Some(DVec2::new(50.0, 0.0)));
        assert!(!doc.graph().has_edge(a, b));
        assert!(doc.graph().has_edge(a, target));
        assert!(doc.graph().has_edge(target, b));
        assert!(doc.graph().has_edge(s, target));

        // One undo unwinds the split and the connection together.
        assert!(doc.undo());
        assert!(doc.graph().has_edge(a, b));
        assert!(doc.graph().vertex(target).is_none());
        assert_eq!(doc.edges().len(), 1);
    }

    #[test]
    fn test_drag_connect_rejects_crossing() {
        let mut doc = Document::new();
        let a = doc.add_vertex(0.0, 0.0);
        let b = doc.add_vertex(100.0, 100.0);
        doc.add_edge(a, b).unwrap();
        let c = doc.add_vertex(0.0, 100.0);

        // Straight line from c to (100, 0) crosses a-b.
        assert_eq!(
            doc.drag_connect(c, 100.0, 0.0),
            Err(EditError::WouldCross)
        );
        assert_eq!(doc.vertices().len(), 3);
        assert_eq!(doc.edges().len(), 1);
    }
}
