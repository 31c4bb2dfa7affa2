//! Selection and group operations: group drag, flip, duplicate, delete,
//! merge, copy/paste.
//!
//! The selection is ephemeral interaction state in selection order; it is
//! never serialized and never part of a command's effect, but the compound
//! operations here read it to decide what they act on.

use std::collections::HashMap;

use glam::DVec2;
use tracing::debug;

use crate::constants::DUPLICATE_OFFSET;
use crate::events::DocumentEvent;
use crate::history::{Command, VertexMove};
use crate::types::{Edge, EditError, Fill, Vertex, VertexId};

use super::{Document, GroupDragState};

/// Mirror axis for [`Document::flip_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// A detached copy of part of the diagram, with original ids.
///
/// Produced by [`Document::copy_selection`]; ids are remapped to fresh ones
/// on paste, so a fragment stays valid however the document changes.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub fills: Vec<Fill>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Document {
    // ========================================================================
    // Selection
    // ========================================================================

    /// Toggle a vertex in or out of the selection group
    pub fn toggle_select(&mut self, id: VertexId) -> Result<(), EditError> {
        if self.graph.vertex(id).is_none() {
            return Err(EditError::UnknownVertex(id));
        }
        if let Some(at) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(at);
        } else {
            self.selection.push(id);
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected vertex ids, in selection order
    pub fn selection(&self) -> &[VertexId] {
        &self.selection
    }

    // ========================================================================
    // Group drag and flip
    // ========================================================================

    /// Start dragging the selection, remembering every original position
    pub fn begin_group_drag(&mut self) -> Result<(), EditError> {
        if self.selection.is_empty() {
            return Err(EditError::InvalidSelection);
        }
        let origins = self
            .selection
            .iter()
            .filter_map(|id| self.graph.position(*id).map(|p| (*id, p)))
            .collect();
        self.group_drag = Some(GroupDragState { origins });
        Ok(())
    }

    /// Move the whole selection live by an offset from the drag start
    pub fn group_drag_to(&mut self, dx: f64, dy: f64) -> Result<(), EditError> {
        let state = self.group_drag.take().ok_or(EditError::NoActiveDrag)?;
        let delta = DVec2::new(dx, dy);
        for (id, origin) in &state.origins {
            if self.graph.move_vertex(*id, *origin + delta).is_ok() {
                let vertex = *self.graph.vertex(*id).expect("vertex moved above");
                self.emit(DocumentEvent::VertexMoved(vertex));
            }
        }
        self.group_drag = Some(state);
        Ok(())
    }

    /// Commit the group drag as one movement command, if anything moved
    pub fn end_group_drag(&mut self) -> Result<(), EditError> {
        let state = self.group_drag.take().ok_or(EditError::NoActiveDrag)?;
        let moves: Vec<VertexMove> = state
            .origins
            .iter()
            .filter_map(|(id, origin)| {
                let current = self.graph.position(*id)?;
                (current != *origin).then_some(VertexMove {
                    vertex: *id,
                    from: *origin,
                    to: current,
                })
            })
            .collect();

        if !moves.is_empty() {
            self.history.record(Command::MoveGroup { moves });
        }
        Ok(())
    }

    /// Mirror the selection across the center of its bounds
    pub fn flip_group(&mut self, axis: FlipAxis) -> Result<(), EditError> {
        if self.selection.is_empty() {
            return Err(EditError::InvalidSelection);
        }
        let Some(bounds) = self.graph.bounds_of(&self.selection) else {
            return Err(EditError::InvalidSelection);
        };
        let center = bounds.center();

        let mut moves = Vec::new();
        for id in self.selection.clone() {
            let Some(from) = self.graph.position(id) else {
                continue;
            };
            let to = match axis {
                FlipAxis::Horizontal => DVec2::new(center.x - (from.x - center.x), from.y),
                FlipAxis::Vertical => DVec2::new(from.x, center.y - (from.y - center.y)),
            };
            if to == from {
                continue;
            }
            self.graph
                .move_vertex(id, to)
                .expect("selected vertex present");
            let vertex = *self.graph.vertex(id).expect("vertex moved above");
            self.emit(DocumentEvent::VertexMoved(vertex));
            moves.push(VertexMove {
                vertex: id,
                from,
                to,
            });
        }

        if !moves.is_empty() {
            self.history.record(Command::MoveGroup { moves });
        }
        Ok(())
    }

    // ========================================================================
    // Duplicate / delete / merge
    // ========================================================================

    /// Clone the selection 20 units down-right: selected vertices, edges
    /// between them, and fills lying wholly inside the selection. The clones
    /// become the new selection.
    pub fn duplicate_group(&mut self) -> Result<Vec<VertexId>, EditError> {
        if self.selection.is_empty() {
            return Err(EditError::InvalidSelection);
        }

        let offset = DVec2::splat(DUPLICATE_OFFSET);
        let mut id_map: HashMap<VertexId, VertexId> = HashMap::new();
        let mut new_vertices = Vec::new();

        for id in self.selection.clone() {
            let Some(position) = self.graph.position(id) else {
                continue;
            };
            let vertex = self.graph.add_vertex(position + offset);
            id_map.insert(id, vertex.id);
            new_vertices.push(vertex);
            self.emit(DocumentEvent::VertexCreated(vertex));
        }

        let mut new_edges = Vec::new();
        for edge in self.graph.edges().to_vec() {
            let (Some(&a), Some(&b)) = (id_map.get(&edge.a), id_map.get(&edge.b)) else {
                continue;
            };
            let edge = self
                .graph
                .add_edge(a, b)
                .expect("cloned endpoints are fresh");
            new_edges.push(edge);
            self.emit(DocumentEvent::EdgeCreated(edge));
        }

        let mut new_fills = Vec::new();
        for fill in self.fills.fills().to_vec() {
            let Some(cycle) = fill
                .cycle
                .iter()
                .map(|id| id_map.get(id).copied())
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let clone = Fill::new(cycle, fill.color.clone());
            self.fills.insert(clone.clone());
            new_fills.push(clone.clone());
            self.emit(DocumentEvent::FillCreated(clone));
        }

        let new_ids: Vec<VertexId> = new_vertices.iter().map(|v| v.id).collect();
        self.selection = new_ids.clone();

        self.history.record(Command::DuplicateGroup {
            vertices: new_vertices,
            edges: new_edges,
            fills: new_fills,
        });
        Ok(new_ids)
    }

    /// Delete every selected vertex, cascading to incident edges and fills
    pub fn delete_group(&mut self) -> Result<(), EditError> {
        if self.selection.is_empty() {
            return Err(EditError::InvalidSelection);
        }

        let vertices: Vec<Vertex> = self
            .selection
            .iter()
            .filter_map(|id| self.graph.vertex(*id).copied())
            .collect();
        let edges: Vec<Edge> = self
            .graph
            .edges()
            .iter()
            .filter(|e| self.selection.contains(&e.a) || self.selection.contains(&e.b))
            .copied()
            .collect();
        let fills: Vec<Fill> = self
            .fills
            .fills()
            .iter()
            .filter(|f| f.cycle.iter().any(|id| self.selection.contains(id)))
            .cloned()
            .collect();

        for id in self.selection.clone() {
            for fill in self.fills.remove_for_vertex(id) {
                self.emit(DocumentEvent::FillRemoved(fill));
            }
            if let Some((_, removed_edges)) = self.graph.remove_vertex(id) {
                for edge in removed_edges {
                    self.emit(DocumentEvent::EdgeRemoved(edge));
                }
                self.emit(DocumentEvent::VertexRemoved(id));
            }
        }
        self.selection.clear();

        self.history.record(Command::DeleteGroup {
            vertices,
            edges,
            fills,
        });
        Ok(())
    }

    /// Merge the second selected vertex into the first
    pub fn merge_selected(&mut self) -> Result<VertexId, EditError> {
        let &[keep, remove] = self.selection.as_slice() else {
            return Err(EditError::InvalidSelection);
        };
        self.merge_vertices(keep, remove)?;
        Ok(keep)
    }

    /// Merge `remove` into `keep`: redirect edges (dropping self-loops and
    /// duplicates), rewrite fills (deleting ones that collapse), delete
    /// `remove`. The kept vertex becomes the selection.
    pub fn merge_vertices(
        &mut self,
        keep: VertexId,
        remove: VertexId,
    ) -> Result<(), EditError> {
        for id in [keep, remove] {
            if self.graph.vertex(id).is_none() {
                return Err(EditError::UnknownVertex(id));
            }
        }
        if keep == remove {
            return Err(EditError::SelfLoop);
        }

        let edges_before = self.graph.edges().to_vec();
        let fills_before = self.fills.fills().to_vec();

        let outcome = self
            .graph
            .merge_vertices(keep, remove)
            .expect("endpoints checked above");
        let (deleted_fills, rewritten_fills) = self.fills.apply_merge(keep, remove);

        debug!(
            ?keep,
            ?remove,
            dropped_edges = outcome.dropped_edges.len(),
            deleted_fills = deleted_fills.len(),
            "merge vertices"
        );

        for edge in &outcome.dropped_edges {
            self.emit(DocumentEvent::EdgeRemoved(*edge));
        }
        for (before, after) in &outcome.redirected_edges {
            self.emit(DocumentEvent::EdgeRemoved(*before));
            self.emit(DocumentEvent::EdgeCreated(*after));
        }
        for fill in &deleted_fills {
            self.emit(DocumentEvent::FillRemoved(fill.clone()));
        }
        for (_, after) in &rewritten_fills {
            if let Some(fill) = self.fills.get(&crate::types::FaceKey::new(after)) {
                self.emit(DocumentEvent::FillUpdated(fill.clone()));
            }
        }
        self.emit(DocumentEvent::VertexRemoved(remove));

        self.selection = vec![keep];

        self.history.record(Command::MergeVertices {
            keep,
            removed: outcome.removed,
            edges_before,
            edges_after: self.graph.edges().to_vec(),
            fills_before,
            fills_after: self.fills.fills().to_vec(),
        });
        Ok(())
    }

    // ========================================================================
    // Copy / paste
    // ========================================================================

    /// Detach a copy of the selection: selected vertices, edges between
    /// them, and fills lying wholly inside the selection
    pub fn copy_selection(&self) -> Result<Fragment, EditError> {
        if self.selection.is_empty() {
            return Err(EditError::InvalidSelection);
        }

        let vertices: Vec<Vertex> = self
            .selection
            .iter()
            .filter_map(|id| self.graph.vertex(*id).copied())
            .collect();
        let edges = self
            .graph
            .edges()
            .iter()
            .filter(|e| self.selection.contains(&e.a) && self.selection.contains(&e.b))
            .copied()
            .collect();
        let fills = self
            .fills
            .fills()
            .iter()
            .filter(|f| f.cycle.iter().all(|id| self.selection.contains(id)))
            .cloned()
            .collect();

        Ok(Fragment {
            vertices,
            edges,
            fills,
        })
    }

    /// Insert a fragment 20 units down-right of where it was copied, under
    /// fresh ids. The pasted vertices become the selection.
    pub fn paste(&mut self, fragment: &Fragment) -> Result<Vec<VertexId>, EditError> {
        if fragment.is_empty() {
            return Err(EditError::InvalidSelection);
        }

        let offset = DVec2::splat(DUPLICATE_OFFSET);
        let mut id_map: HashMap<VertexId, VertexId> = HashMap::new();
        let mut vertices = Vec::new();
        for v in &fragment.vertices {
            let vertex = self.graph.add_vertex(v.position + offset);
            id_map.insert(v.id, vertex.id);
            vertices.push(vertex);
            self.emit(DocumentEvent::VertexCreated(vertex));
        }

        let mut edges = Vec::new();
        for e in &fragment.edges {
            let (Some(&a), Some(&b)) = (id_map.get(&e.a), id_map.get(&e.b)) else {
                continue;
            };
            let edge = self
                .graph
                .add_edge(a, b)
                .expect("pasted endpoints are fresh");
            edges.push(edge);
            self.emit(DocumentEvent::EdgeCreated(edge));
        }

        let mut fills = Vec::new();
        for f in &fragment.fills {
            let Some(cycle) = f
                .cycle
                .iter()
                .map(|id| id_map.get(id).copied())
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let fill = Fill::new(cycle, f.color.clone());
            self.fills.insert(fill.clone());
            fills.push(fill.clone());
            self.emit(DocumentEvent::FillCreated(fill));
        }

        let new_ids: Vec<VertexId> = vertices.iter().map(|v| v.id).collect();
        self.selection = new_ids.clone();

        self.history.record(Command::Paste {
            vertices,
            edges,
            fills,
        });
        Ok(new_ids)
    }
}
