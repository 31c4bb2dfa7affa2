//! Data model for the diagram document.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Type-safe vertex identifier
///
/// Ids are minted monotonically by the graph store and never reused, even
/// across deletions; undo restores entities under their original ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VertexId(pub u32);

/// A vertex in the diagram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub position: DVec2,
}

impl Vertex {
    pub fn new(id: VertexId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: DVec2::new(x, y),
        }
    }
}

/// An undirected edge between two vertices
///
/// Equality and hashing ignore endpoint order: `(a, b)` and `(b, a)` denote
/// the same edge. The stored order is preserved for rendering identity only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
}

impl Edge {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        Self { a, b }
    }

    /// Check whether this edge joins the given unordered vertex pair
    pub fn joins(&self, x: VertexId, y: VertexId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Check whether the given vertex is one of this edge's endpoints
    pub fn touches(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }

    /// Get the endpoint opposite to `v`, if `v` is an endpoint
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if self.a == v {
            Some(self.b)
        } else if self.b == v {
            Some(self.a)
        } else {
            None
        }
    }

    fn normalized(&self) -> (VertexId, VertexId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

/// Order- and direction-independent identity of a face
///
/// Two boundary cycles denote the same face iff their vertex-id sets are
/// equal; the key is the sorted, deduplicated id list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FaceKey(Vec<VertexId>);

impl FaceKey {
    pub fn new(cycle: &[VertexId]) -> Self {
        let mut ids = cycle.to_vec();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }

    pub fn ids(&self) -> &[VertexId] {
        &self.0
    }

    /// Number of distinct vertices on the face boundary
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.0.binary_search(&id).is_ok()
    }
}

/// A user-assigned color bound to one bounded face
///
/// The boundary cycle is stored once, as traced at fill time; positions are
/// always resolved from the graph, so vertex moves need no registry update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub cycle: Vec<VertexId>,
    pub color: String,
}

impl Fill {
    pub fn new(cycle: Vec<VertexId>, color: impl Into<String>) -> Self {
        Self {
            cycle,
            color: color.into(),
        }
    }

    /// Set-based identity of the filled face
    pub fn key(&self) -> FaceKey {
        FaceKey::new(&self.cycle)
    }
}

/// Axis-aligned bounds of a set of vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in points {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

/// Full document state for persistence and atomic import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub fills: Vec<Fill>,
    pub next_vertex_id: u32,
}

impl Snapshot {
    /// State equality ignoring storage order.
    ///
    /// Undo restores destroyed entities by appending, so two snapshots of
    /// identical state may list entities in different orders.
    pub fn equivalent(&self, other: &Snapshot) -> bool {
        if self.next_vertex_id != other.next_vertex_id {
            return false;
        }

        let by_id = |vertices: &[Vertex]| {
            let mut sorted = vertices.to_vec();
            sorted.sort_by_key(|v| v.id);
            sorted
        };
        if by_id(&self.vertices) != by_id(&other.vertices) {
            return false;
        }

        let edge_set = |edges: &[Edge]| -> std::collections::HashSet<Edge> {
            edges.iter().copied().collect()
        };
        if edge_set(&self.edges) != edge_set(&other.edges) {
            return false;
        }

        let by_key = |fills: &[Fill]| {
            let mut sorted = fills.to_vec();
            sorted.sort_by(|a, b| {
                a.key()
                    .ids()
                    .cmp(b.key().ids())
                    .then_with(|| a.color.cmp(&b.color))
            });
            sorted
        };
        by_key(&self.fills)
            .iter()
            .map(|f| (f.key(), f.color.clone()))
            .eq(by_key(&other.fills).iter().map(|f| (f.key(), f.color.clone())))
    }
}

/// A mutating operation was refused before any state change
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("unknown vertex id {0:?}")]
    UnknownVertex(VertexId),
    #[error("edge endpoints are the same vertex")]
    SelfLoop,
    #[error("an edge between these vertices already exists")]
    DuplicateEdge,
    #[error("no edge joins these vertices")]
    UnknownEdge,
    #[error("edge would cross an existing edge")]
    WouldCross,
    #[error("no bounded face contains the point")]
    NoFaceAtPoint,
    #[error("no edge body within range of the point")]
    NoSplitTarget,
    #[error("selection does not allow this operation")]
    InvalidSelection,
    #[error("no drag in progress")]
    NoActiveDrag,
}
