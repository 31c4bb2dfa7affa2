//! Change notifications emitted after each committed mutation.
//!
//! Render collaborators subscribe to these instead of polling; the engine
//! never reads rendering state back. Events also fire for mutations applied
//! by undo/redo, so a listener mirrors the document without special cases.

use crate::types::{Edge, Fill, Vertex, VertexId};

/// One committed change to the document state.
#[derive(Debug, Clone)]
pub enum DocumentEvent {
    VertexCreated(Vertex),
    VertexMoved(Vertex),
    VertexRemoved(VertexId),
    EdgeCreated(Edge),
    EdgeRemoved(Edge),
    FillCreated(Fill),
    FillUpdated(Fill),
    FillRemoved(Fill),
}

/// Listener callback for document events.
///
/// The document is single-threaded; listeners run synchronously on the
/// mutating call and must not re-enter the document.
pub type EventListener = Box<dyn Fn(&DocumentEvent)>;
