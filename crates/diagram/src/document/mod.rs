//! The editable diagram document.
//!
//! One mutable aggregate ties the graph store, fill registry, and command
//! log together with the ephemeral interaction state (selection, in-progress
//! drags) and the render listeners. Every public mutation validates its
//! preconditions up front, applies, records exactly one command, and emits
//! change events; a rejected operation has no effect at all.
//!
//! The document is single-threaded, synchronous, and non-reentrant: each
//! operation runs to completion before the next may begin.

mod edit;
mod group;
mod snapshot;
mod undo;

pub use group::{FlipAxis, Fragment};
pub use snapshot::ImportError;

use glam::DVec2;
use skein_config::EditorConfig;

use crate::events::{DocumentEvent, EventListener};
use crate::faces;
use crate::fills::FillRegistry;
use crate::graph::GraphStore;
use crate::history::CommandLog;
use crate::planarity;
use crate::types::{Bounds, Edge, Fill, Vertex, VertexId};

/// Transient state of an in-progress single-vertex drag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DragState {
    pub vertex: VertexId,
    pub origin: DVec2,
}

/// Transient original positions of an in-progress group drag.
#[derive(Debug, Clone)]
pub(crate) struct GroupDragState {
    pub origins: Vec<(VertexId, DVec2)>,
}

/// The diagram document: graph, fills, history, and interaction state.
pub struct Document {
    pub(crate) graph: GraphStore,
    pub(crate) fills: FillRegistry,
    pub(crate) history: CommandLog,
    /// Selected vertex ids in selection order; ephemeral, never recorded
    pub(crate) selection: Vec<VertexId>,
    pub(crate) drag: Option<DragState>,
    pub(crate) group_drag: Option<GroupDragState>,
    pub(crate) config: EditorConfig,
    listeners: Vec<EventListener>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("vertices", &self.graph.vertex_count())
            .field("edges", &self.graph.edge_count())
            .field("fills", &self.fills.len())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("selection", &self.selection)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with default configuration
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an empty document with the given configuration
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            graph: GraphStore::new(),
            fills: FillRegistry::new(),
            history: CommandLog::new(config.history_depth),
            selection: Vec::new(),
            drag: None,
            group_drag: None,
            config,
            listeners: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.graph.vertices()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn fills(&self) -> &[Fill] {
        self.fills.fills()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========================================================================
    // Queries for external selection/transform tooling
    // ========================================================================

    /// All bounded faces of the current graph (recomputed, never cached)
    pub fn faces(&self) -> Vec<Vec<VertexId>> {
        faces::find_faces(&self.graph)
    }

    /// The bounded face containing the given point, if any
    pub fn face_at(&self, x: f64, y: f64) -> Option<Vec<VertexId>> {
        faces::face_at(&self.graph, DVec2::new(x, y))
    }

    /// Whether an edge between `a` and `b` would properly cross an existing edge
    pub fn would_cross(&self, a: VertexId, b: VertexId) -> bool {
        planarity::crossing_edge(&self.graph, a, b).is_some()
    }

    /// Axis-aligned bounds of the given vertices
    pub fn bounds_of(&self, ids: &[VertexId]) -> Option<Bounds> {
        self.graph.bounds_of(ids)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register a render listener.
    ///
    /// Listeners fire synchronously after each committed mutation, including
    /// mutations applied by undo and redo.
    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: Fn(&DocumentEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn emit(&self, event: DocumentEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}
