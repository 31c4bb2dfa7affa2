//! Reversible command records.
//!
//! Each operation kind is a distinct variant carrying exactly the data its
//! inverse needs: snapshots of destroyed entities under their original ids,
//! the minted ids of created entities, and full before/after payloads where
//! an operation rewrites collections wholesale (merge, import). Movement
//! variants carry both endpoints, computed once at record time, so neither
//! undo nor redo ever mutates a historical record.

use glam::DVec2;

use crate::types::{Edge, Fill, Snapshot, Vertex, VertexId};

/// One recorded movement of a single vertex within a group operation.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexMove {
    pub vertex: VertexId,
    pub from: DVec2,
    pub to: DVec2,
}

/// Everything a split changed: the replaced edge, the minted vertex, the two
/// replacement halves, and the fill boundaries rewritten around the split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    pub replaced: Edge,
    pub vertex: Vertex,
    pub halves: [Edge; 2],
    pub rewritten_fills: Vec<(Vec<VertexId>, Vec<VertexId>)>,
}

/// A reversible record of one state-mutating operation.
#[derive(Debug, Clone)]
pub enum Command {
    AddVertex {
        vertex: Vertex,
    },
    RemoveVertex {
        vertex: Vertex,
        edges: Vec<Edge>,
        fills: Vec<Fill>,
    },
    AddEdge {
        edge: Edge,
    },
    RemoveEdge {
        edge: Edge,
        fills: Vec<Fill>,
    },
    MoveVertex {
        vertex: VertexId,
        from: DVec2,
        to: DVec2,
    },
    ClearAll {
        snapshot: Snapshot,
    },
    AddFill {
        fill: Fill,
    },
    UpdateFill {
        cycle: Vec<VertexId>,
        old_color: String,
        new_color: String,
    },
    RemoveFill {
        fill: Fill,
    },
    Import {
        old: Snapshot,
        new: Snapshot,
    },
    MoveGroup {
        moves: Vec<VertexMove>,
    },
    DuplicateGroup {
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        fills: Vec<Fill>,
    },
    DeleteGroup {
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        fills: Vec<Fill>,
    },
    MergeVertices {
        keep: VertexId,
        removed: Vertex,
        edges_before: Vec<Edge>,
        edges_after: Vec<Edge>,
        fills_before: Vec<Fill>,
        fills_after: Vec<Fill>,
    },
    SplitEdge {
        split: SplitRecord,
    },
    DragConnect {
        edge: Edge,
        created: Option<Vertex>,
        split: Option<SplitRecord>,
    },
    Paste {
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        fills: Vec<Fill>,
    },
}

impl Command {
    /// Stable name of the operation kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddVertex { .. } => "add_vertex",
            Command::RemoveVertex { .. } => "remove_vertex",
            Command::AddEdge { .. } => "add_edge",
            Command::RemoveEdge { .. } => "remove_edge",
            Command::MoveVertex { .. } => "move_vertex",
            Command::ClearAll { .. } => "clear_all",
            Command::AddFill { .. } => "add_fill",
            Command::UpdateFill { .. } => "update_fill",
            Command::RemoveFill { .. } => "remove_fill",
            Command::Import { .. } => "import",
            Command::MoveGroup { .. } => "move_group",
            Command::DuplicateGroup { .. } => "duplicate_group",
            Command::DeleteGroup { .. } => "delete_group",
            Command::MergeVertices { .. } => "merge_vertices",
            Command::SplitEdge { .. } => "split_edge",
            Command::DragConnect { .. } => "drag_connect",
            Command::Paste { .. } => "paste",
        }
    }
}
