//! Undo/redo: applying the inverse and forward effects of recorded commands.
//!
//! Commands are historical facts. A referenced vertex or edge may be gone
//! after a compound undo sequence, so every sub-step here is defensive: a
//! missing reference skips that sub-step and never fails the whole
//! operation. Any active selection or drag is dropped before a step applies,
//! so nothing holds ids the step may remove.

use tracing::debug;

use crate::events::DocumentEvent;
use crate::history::{Command, SplitRecord};
use crate::types::{Edge, FaceKey, Fill, Vertex, VertexId};

use super::Document;

impl Document {
    /// Undo the most recent command; false if there is nothing to undo
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        self.clear_selection();
        self.drag = None;
        self.group_drag = None;

        let Some(command) = self.history.pop_undo() else {
            return false;
        };
        debug!(kind = command.kind(), "undo");
        self.apply_inverse(&command);
        self.history.push_redoable(command);
        true
    }

    /// Re-apply the most recently undone command; false if there is none
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        self.clear_selection();
        self.drag = None;
        self.group_drag = None;

        let Some(command) = self.history.pop_redo() else {
            return false;
        };
        debug!(kind = command.kind(), "redo");
        self.apply_forward(&command);
        self.history.push_undoable(command);
        true
    }

    // ========================================================================
    // Inverse effects
    // ========================================================================

    fn apply_inverse(&mut self, command: &Command) {
        match command {
            Command::AddVertex { vertex } => {
                self.drop_vertex_cascading(vertex.id);
            }
            Command::RemoveVertex {
                vertex,
                edges,
                fills,
            } => {
                self.restore_vertex(*vertex);
                self.restore_edges(edges);
                self.restore_fills(fills);
            }
            Command::AddEdge { edge } => {
                self.drop_edge(*edge);
            }
            Command::RemoveEdge { edge, fills } => {
                self.restore_edges(std::slice::from_ref(edge));
                self.restore_fills(fills);
            }
            Command::MoveVertex { vertex, from, .. } => {
                self.restore_position(*vertex, *from);
            }
            Command::ClearAll { snapshot } => {
                self.apply_snapshot(snapshot);
            }
            Command::AddFill { fill } => {
                self.drop_fill(&fill.key());
            }
            Command::UpdateFill {
                cycle, old_color, ..
            } => {
                self.recolor_fill(cycle, old_color);
            }
            Command::RemoveFill { fill } => {
                self.restore_fills(std::slice::from_ref(fill));
            }
            Command::Import { old, .. } => {
                self.apply_snapshot(old);
            }
            Command::MoveGroup { moves } => {
                for m in moves {
                    self.restore_position(m.vertex, m.from);
                }
            }
            Command::DuplicateGroup {
                vertices, fills, ..
            }
            | Command::Paste {
                vertices, fills, ..
            } => {
                // Dropping the minted vertices cascades to the cloned edges.
                for fill in fills {
                    self.drop_fill(&fill.key());
                }
                for vertex in vertices {
                    self.drop_vertex_cascading(vertex.id);
                }
            }
            Command::DeleteGroup {
                vertices,
                edges,
                fills,
            } => {
                for vertex in vertices {
                    self.restore_vertex(*vertex);
                }
                self.restore_edges(edges);
                self.restore_fills(fills);
            }
            Command::MergeVertices {
                removed,
                edges_before,
                fills_before,
                ..
            } => {
                self.restore_vertex(*removed);
                self.replace_edges(edges_before.clone());
                self.replace_fills(fills_before.clone());
            }
            Command::SplitEdge { split } => {
                self.unapply_split(split);
            }
            Command::DragConnect {
                edge,
                created,
                split,
            } => {
                self.drop_edge(*edge);
                if let Some(split) = split {
                    self.unapply_split(split);
                }
                if let Some(vertex) = created {
                    self.drop_vertex_cascading(vertex.id);
                }
            }
        }
    }

    // ========================================================================
    // Forward effects (redo)
    // ========================================================================

    fn apply_forward(&mut self, command: &Command) {
        match command {
            Command::AddVertex { vertex } => {
                self.restore_vertex(*vertex);
            }
            Command::RemoveVertex { vertex, .. } => {
                self.drop_vertex_cascading(vertex.id);
            }
            Command::AddEdge { edge } => {
                self.restore_edges(std::slice::from_ref(edge));
            }
            Command::RemoveEdge { edge, fills } => {
                self.drop_edge(*edge);
                for fill in fills {
                    self.drop_fill(&fill.key());
                }
            }
            Command::MoveVertex { vertex, to, .. } => {
                self.restore_position(*vertex, *to);
            }
            Command::ClearAll { .. } => {
                self.drop_all_with_events();
            }
            Command::AddFill { fill } => {
                self.restore_fills(std::slice::from_ref(fill));
            }
            Command::UpdateFill {
                cycle, new_color, ..
            } => {
                self.recolor_fill(cycle, new_color);
            }
            Command::RemoveFill { fill } => {
                self.drop_fill(&fill.key());
            }
            Command::Import { new, .. } => {
                self.apply_snapshot(new);
            }
            Command::MoveGroup { moves } => {
                for m in moves {
                    self.restore_position(m.vertex, m.to);
                }
            }
            Command::DuplicateGroup {
                vertices,
                edges,
                fills,
            }
            | Command::Paste {
                vertices,
                edges,
                fills,
            } => {
                for vertex in vertices {
                    self.restore_vertex(*vertex);
                }
                self.restore_edges(edges);
                self.restore_fills(fills);
            }
            Command::DeleteGroup { vertices, .. } => {
                for vertex in vertices {
                    self.drop_vertex_cascading(vertex.id);
                }
            }
            Command::MergeVertices {
                removed,
                edges_after,
                fills_after,
                ..
            } => {
                if let Some((_, edges)) = self.graph.remove_vertex(removed.id) {
                    for edge in edges {
                        self.emit(DocumentEvent::EdgeRemoved(edge));
                    }
                    self.emit(DocumentEvent::VertexRemoved(removed.id));
                }
                self.replace_edges(edges_after.clone());
                self.replace_fills(fills_after.clone());
            }
            Command::SplitEdge { split } => {
                self.reapply_split(split);
            }
            Command::DragConnect {
                edge,
                created,
                split,
            } => {
                if let Some(vertex) = created {
                    self.restore_vertex(*vertex);
                }
                if let Some(split) = split {
                    self.reapply_split(split);
                }
                self.restore_edges(std::slice::from_ref(edge));
            }
        }
    }

    // ========================================================================
    // Restore / drop helpers (each skips quietly when its target is missing)
    // ========================================================================

    fn restore_vertex(&mut self, vertex: Vertex) {
        if self.graph.vertex(vertex.id).is_some() {
            return;
        }
        self.graph.insert_vertex(vertex);
        self.emit(DocumentEvent::VertexCreated(vertex));
    }

    fn restore_position(&mut self, id: VertexId, position: glam::DVec2) {
        if self.graph.move_vertex(id, position).is_ok() {
            let vertex = *self.graph.vertex(id).expect("vertex moved above");
            self.emit(DocumentEvent::VertexMoved(vertex));
        }
    }

    fn restore_edges(&mut self, edges: &[Edge]) {
        for edge in edges {
            // Both endpoints must still exist for the edge to come back.
            if self.graph.vertex(edge.a).is_none() || self.graph.vertex(edge.b).is_none() {
                continue;
            }
            if self.graph.has_edge(edge.a, edge.b) {
                continue;
            }
            self.graph.insert_edge(*edge);
            self.emit(DocumentEvent::EdgeCreated(*edge));
        }
    }

    fn restore_fills(&mut self, fills: &[Fill]) {
        for fill in fills {
            if self.fills.get(&fill.key()).is_some() {
                continue;
            }
            self.fills.insert(fill.clone());
            self.emit(DocumentEvent::FillCreated(fill.clone()));
        }
    }

    fn drop_vertex_cascading(&mut self, id: VertexId) {
        for fill in self.fills.remove_for_vertex(id) {
            self.emit(DocumentEvent::FillRemoved(fill));
        }
        if let Some((_, edges)) = self.graph.remove_vertex(id) {
            for edge in edges {
                self.emit(DocumentEvent::EdgeRemoved(edge));
            }
            self.emit(DocumentEvent::VertexRemoved(id));
        }
    }

    fn drop_edge(&mut self, edge: Edge) {
        if self.graph.remove_edge(edge.a, edge.b).is_some() {
            self.emit(DocumentEvent::EdgeRemoved(edge));
        }
    }

    fn drop_fill(&mut self, key: &FaceKey) {
        if let Some(fill) = self.fills.remove(key) {
            self.emit(DocumentEvent::FillRemoved(fill));
        }
    }

    fn recolor_fill(&mut self, cycle: &[VertexId], color: &str) {
        let key = FaceKey::new(cycle);
        if self.fills.get(&key).is_some() {
            self.fills.set_fill(cycle, color);
            let fill = self.fills.get(&key).expect("fill present above").clone();
            self.emit(DocumentEvent::FillUpdated(fill));
        }
    }

    /// Replace the whole edge set, emitting the difference
    fn replace_edges(&mut self, edges: Vec<Edge>) {
        for edge in self.graph.edges().to_vec() {
            if !edges.contains(&edge) {
                self.emit(DocumentEvent::EdgeRemoved(edge));
            }
        }
        for edge in &edges {
            if !self.graph.edges().contains(edge) {
                self.emit(DocumentEvent::EdgeCreated(*edge));
            }
        }
        self.graph.set_edges(edges);
    }

    /// Replace the whole fill collection, emitting the difference
    fn replace_fills(&mut self, fills: Vec<Fill>) {
        for fill in self.fills.fills().to_vec() {
            if !fills.iter().any(|f| f.key() == fill.key()) {
                self.emit(DocumentEvent::FillRemoved(fill));
            }
        }
        for fill in &fills {
            let replaced = self.fills.get(&fill.key());
            match replaced {
                None => self.emit(DocumentEvent::FillCreated(fill.clone())),
                Some(existing) if *existing != *fill => {
                    self.emit(DocumentEvent::FillUpdated(fill.clone()));
                }
                Some(_) => {}
            }
        }
        self.fills.restore(fills);
    }

    fn unapply_split(&mut self, split: &SplitRecord) {
        // Boundaries must lose the split vertex before it is dropped, or the
        // vertex cascade would take the rewritten fills with it.
        for (before, after) in &split.rewritten_fills {
            if self.fills.rewrite(&FaceKey::new(after), before.clone()).is_some() {
                if let Some(fill) = self.fills.get(&FaceKey::new(before)) {
                    self.emit(DocumentEvent::FillUpdated(fill.clone()));
                }
            }
        }
        for half in &split.halves {
            self.drop_edge(*half);
        }
        self.drop_vertex_cascading(split.vertex.id);
        self.restore_edges(std::slice::from_ref(&split.replaced));
    }

    fn reapply_split(&mut self, split: &SplitRecord) {
        self.drop_edge(split.replaced);
        self.restore_vertex(split.vertex);
        self.restore_edges(&split.halves);
        for (before, after) in &split.rewritten_fills {
            if self.fills.rewrite(&FaceKey::new(before), after.clone()).is_some() {
                if let Some(fill) = self.fills.get(&FaceKey::new(after)) {
                    self.emit(DocumentEvent::FillUpdated(fill.clone()));
                }
            }
        }
    }
}
