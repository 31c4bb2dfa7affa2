//! Persistence snapshot: export, atomic import, clear-all.
//!
//! The snapshot is the engine's entire persistence contract; reading and
//! writing it to storage or files is an external collaborator's job.

use std::collections::HashSet;

use tracing::debug;

use crate::events::DocumentEvent;
use crate::history::Command;
use crate::types::{Snapshot, VertexId};

use super::Document;

/// Import input was malformed; the operation failed as a whole and no
/// partial state was applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("vertex id {0:?} appears more than once")]
    DuplicateVertexId(VertexId),
    #[error("edge references unknown vertex id {0:?}")]
    UnknownEdgeEndpoint(VertexId),
    #[error("edge connects a vertex to itself")]
    SelfLoopEdge,
    #[error("duplicate edge between {0:?} and {1:?}")]
    DuplicateEdge(VertexId, VertexId),
    #[error("fill references unknown vertex id {0:?}")]
    UnknownFillVertex(VertexId),
    #[error("fill boundary has fewer than 3 distinct vertices")]
    DegenerateFill,
}

impl Document {
    /// Capture the full document state
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            vertices: self.graph.vertices().to_vec(),
            edges: self.graph.edges().to_vec(),
            fills: self.fills.fills().to_vec(),
            next_vertex_id: self.graph.next_vertex_id(),
        }
    }

    /// Replace the entire document state atomically.
    ///
    /// The snapshot is validated first; any defect fails the import as a
    /// whole with no state change and no recorded command. A successful
    /// import is one undoable command carrying the full prior and new state.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<(), ImportError> {
        validate_snapshot(&snapshot)?;

        let old = self.export_snapshot();
        debug!(
            vertices = snapshot.vertices.len(),
            edges = snapshot.edges.len(),
            fills = snapshot.fills.len(),
            "import snapshot"
        );

        self.clear_selection();
        self.apply_snapshot(&snapshot);
        self.history.record(Command::Import { old, new: snapshot });
        Ok(())
    }

    /// Remove every vertex, edge, and fill as one undoable command.
    ///
    /// The id counter is not reset, so ids stay unique across a clear.
    pub fn clear_all(&mut self) {
        if self.graph.is_empty() && self.fills.is_empty() {
            return;
        }

        let snapshot = self.export_snapshot();
        self.clear_selection();
        self.drop_all_with_events();
        self.history.record(Command::ClearAll { snapshot });
    }

    /// Swap in a snapshot's state wholesale, emitting removal events for the
    /// outgoing entities and creation events for the incoming ones. Shared
    /// by import and by the undo/redo paths of import and clear-all.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.drop_all_with_events();

        // The counter must cover every restored id so later mints stay unique.
        let next_vertex_id = snapshot
            .vertices
            .iter()
            .map(|v| v.id.0)
            .max()
            .unwrap_or(0)
            .max(snapshot.next_vertex_id);
        self.graph.restore(
            snapshot.vertices.clone(),
            snapshot.edges.clone(),
            next_vertex_id,
        );
        self.fills.restore(snapshot.fills.clone());

        for vertex in self.graph.vertices().to_vec() {
            self.emit(DocumentEvent::VertexCreated(vertex));
        }
        for edge in self.graph.edges().to_vec() {
            self.emit(DocumentEvent::EdgeCreated(edge));
        }
        for fill in self.fills.fills().to_vec() {
            self.emit(DocumentEvent::FillCreated(fill));
        }
    }

    /// Drop the current graph and fills, emitting removal events
    pub(crate) fn drop_all_with_events(&mut self) {
        for fill in self.fills.fills().to_vec() {
            self.emit(DocumentEvent::FillRemoved(fill));
        }
        for edge in self.graph.edges().to_vec() {
            self.emit(DocumentEvent::EdgeRemoved(edge));
        }
        for vertex in self.graph.vertices().to_vec() {
            self.emit(DocumentEvent::VertexRemoved(vertex.id));
        }
        self.fills.clear();
        self.graph.clear();
    }
}

fn validate_snapshot(snapshot: &Snapshot) -> Result<(), ImportError> {
    let mut ids = HashSet::new();
    for vertex in &snapshot.vertices {
        if !ids.insert(vertex.id) {
            return Err(ImportError::DuplicateVertexId(vertex.id));
        }
    }

    let mut seen_edges = HashSet::new();
    for edge in &snapshot.edges {
        if edge.a == edge.b {
            return Err(ImportError::SelfLoopEdge);
        }
        for endpoint in [edge.a, edge.b] {
            if !ids.contains(&endpoint) {
                return Err(ImportError::UnknownEdgeEndpoint(endpoint));
            }
        }
        if !seen_edges.insert(*edge) {
            return Err(ImportError::DuplicateEdge(edge.a, edge.b));
        }
    }

    for fill in &snapshot.fills {
        for id in &fill.cycle {
            if !ids.contains(id) {
                return Err(ImportError::UnknownFillVertex(*id));
            }
        }
        if fill.key().len() < 3 {
            return Err(ImportError::DegenerateFill);
        }
    }

    Ok(())
}
