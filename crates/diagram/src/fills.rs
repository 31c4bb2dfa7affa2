//! Face-to-color registry.
//!
//! Fills are a loose collection matched by set-based face identity
//! ([`FaceKey`]). The registry owns reconciliation: whenever edges or
//! vertices disappear or merge, fills whose stored boundary no longer
//! describes an enclosed face are rewritten or deleted, so every fill the
//! caller can observe corresponds to a real face.

use crate::graph::GraphStore;
use crate::types::{FaceKey, Fill, VertexId};

/// Outcome of [`FillRegistry::set_fill`], carrying what a command needs to invert it.
#[derive(Debug, Clone, PartialEq)]
pub enum SetFillOutcome {
    /// A new fill was inserted
    Created(Fill),
    /// An existing fill was recolored
    Recolored {
        cycle: Vec<VertexId>,
        old_color: String,
        new_color: String,
    },
}

/// Owner of the fill collection.
#[derive(Debug, Clone, Default)]
pub struct FillRegistry {
    fills: Vec<Fill>,
}

impl FillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Get the fill for a face identity, if any
    pub fn get(&self, key: &FaceKey) -> Option<&Fill> {
        self.fills.iter().find(|f| f.key() == *key)
    }

    /// Insert a fill verbatim (undo/redo restore path)
    pub fn insert(&mut self, fill: Fill) {
        let key = fill.key();
        if self.get(&key).is_none() {
            self.fills.push(fill);
        }
    }

    /// Bind a color to a face: recolor if the face identity is already
    /// filled, otherwise insert the cycle as given (not normalized).
    pub fn set_fill(&mut self, cycle: &[VertexId], color: &str) -> SetFillOutcome {
        let key = FaceKey::new(cycle);
        if let Some(fill) = self.fills.iter_mut().find(|f| f.key() == key) {
            let old_color = std::mem::replace(&mut fill.color, color.to_string());
            SetFillOutcome::Recolored {
                cycle: fill.cycle.clone(),
                old_color,
                new_color: color.to_string(),
            }
        } else {
            let fill = Fill::new(cycle.to_vec(), color);
            self.fills.push(fill.clone());
            SetFillOutcome::Created(fill)
        }
    }

    /// Remove the fill matching a face identity, returning it
    pub fn remove(&mut self, key: &FaceKey) -> Option<Fill> {
        let index = self.fills.iter().position(|f| f.key() == *key)?;
        Some(self.fills.remove(index))
    }

    /// Rewrite the boundary cycle of the fill matching `key`
    ///
    /// Restore path for split undo; returns the rewritten fill state.
    pub fn rewrite(&mut self, key: &FaceKey, cycle: Vec<VertexId>) -> Option<Fill> {
        let fill = self.fills.iter_mut().find(|f| f.key() == *key)?;
        fill.cycle = cycle;
        Some(fill.clone())
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Delete every fill containing the given vertex (vertex removal cascade)
    pub fn remove_for_vertex(&mut self, id: VertexId) -> Vec<Fill> {
        let mut removed = Vec::new();
        self.fills.retain(|f| {
            if f.cycle.contains(&id) {
                removed.push(f.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Delete every fill with a consecutive boundary pair (wrapping) that is
    /// no longer joined by an existing edge. Run after any edge removal.
    pub fn remove_broken(&mut self, graph: &GraphStore) -> Vec<Fill> {
        let mut removed = Vec::new();
        self.fills.retain(|f| {
            if cycle_enclosed(graph, &f.cycle) {
                true
            } else {
                removed.push(f.clone());
                false
            }
        });
        removed
    }

    /// Fills that would be invalidated by removing the edge `a-b`, without
    /// mutating the registry (recorded before the removal applies).
    pub fn broken_by_edge(&self, a: VertexId, b: VertexId) -> Vec<Fill> {
        self.fills
            .iter()
            .filter(|f| {
                consecutive_pairs(&f.cycle).any(|(p, q)| (p == a && q == b) || (p == b && q == a))
            })
            .cloned()
            .collect()
    }

    /// Rewrite `remove -> keep` in every fill containing `remove`; fills
    /// whose boundary collapses below 3 distinct ids are deleted instead.
    ///
    /// Returns the deleted fills and the (before, after) cycles of rewrites.
    pub fn apply_merge(
        &mut self,
        keep: VertexId,
        remove: VertexId,
    ) -> (Vec<Fill>, Vec<(Vec<VertexId>, Vec<VertexId>)>) {
        let mut deleted = Vec::new();
        let mut rewritten = Vec::new();

        let mut kept = Vec::with_capacity(self.fills.len());
        for mut fill in self.fills.drain(..) {
            if !fill.cycle.contains(&remove) {
                kept.push(fill);
                continue;
            }

            let mut cycle: Vec<VertexId> = fill
                .cycle
                .iter()
                .map(|&id| if id == remove { keep } else { id })
                .collect();
            dedup_preserving_order(&mut cycle);

            if cycle.len() < 3 {
                deleted.push(fill);
            } else {
                rewritten.push((fill.cycle.clone(), cycle.clone()));
                fill.cycle = cycle;
                kept.push(fill);
            }
        }
        self.fills = kept;

        (deleted, rewritten)
    }

    /// Insert the split vertex `v` between every consecutive `a`,`b` pair
    /// (either direction, wrapping). The enclosed region is unchanged by a
    /// split, so affected fills are rewritten rather than deleted.
    ///
    /// Returns the (before, after) cycles of rewrites.
    pub fn apply_split(
        &mut self,
        a: VertexId,
        b: VertexId,
        v: VertexId,
    ) -> Vec<(Vec<VertexId>, Vec<VertexId>)> {
        let mut rewritten = Vec::new();
        for fill in &mut self.fills {
            let Some(at) = consecutive_pairs(&fill.cycle)
                .position(|(p, q)| (p == a && q == b) || (p == b && q == a))
            else {
                continue;
            };
            let before = fill.cycle.clone();
            fill.cycle.insert(at + 1, v);
            rewritten.push((before, fill.cycle.clone()));
        }
        rewritten
    }

    // ========================================================================
    // Bulk state (clear-all, import, undo restore)
    // ========================================================================

    pub fn clear(&mut self) {
        self.fills.clear();
    }

    /// Replace the entire fill collection verbatim
    pub fn restore(&mut self, fills: Vec<Fill>) {
        self.fills = fills;
    }
}

/// Whether every consecutive boundary pair (wrapping) is joined by an edge
pub fn cycle_enclosed(graph: &GraphStore, cycle: &[VertexId]) -> bool {
    cycle.len() >= 3 && consecutive_pairs(cycle).all(|(a, b)| graph.has_edge(a, b))
}

fn consecutive_pairs(cycle: &[VertexId]) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
    (0..cycle.len()).map(|i| (cycle[i], cycle[(i + 1) % cycle.len()]))
}

fn dedup_preserving_order(ids: &mut Vec<VertexId>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn v(n: u32) -> VertexId {
        VertexId(n)
    }

    fn triangle_graph() -> (GraphStore, VertexId, VertexId, VertexId) {
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
    fn test_set_fill_insert_then_recolor() {
        let mut registry = FillRegistry::new();
        let outcome = registry.set_fill(&[v(1), v(2), v(3)], "#ff0000");
        assert!(matches!(outcome, SetFillOutcome::Created(_)));
        assert_eq!(registry.len(), 1);

        // Same face in a different rotation recolors instead of inserting.
        let outcome = registry.set_fill(&[v(3), v(1), v(2)], "#00ff00");
        match outcome {
            SetFillOutcome::Recolored {
                old_color,
                new_color,
                ..
            } => {
                assert_eq!(old_color, "#ff0000");
                assert_eq!(new_color, "#00ff00");
            }
            other => panic!("expected recolor, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
        // The stored cycle keeps its original order.
        assert_eq!(registry.fills()[0].cycle, vec![v(1), v(2), v(3)]);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut registry = FillRegistry::new();
        registry.set_fill(&[v(1), v(2), v(3)], "#ff0000");

        let removed = registry.remove(&FaceKey::new(&[v(2), v(3), v(1)]));
        assert!(removed.is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(&FaceKey::new(&[v(1), v(2), v(3)])).is_none());
    }

    #[test]
    fn test_remove_broken_after_edge_removal() {
        let (mut graph, a, b, c) = triangle_graph();
        let mut registry = FillRegistry::new();
        registry.set_fill(&[a, b, c], "#ff0000");

        // Removing an unrelated edge leaves the fill alone.
        let d = graph.add_vertex(DVec2::new(50.0, 50.0)).id;
        graph.add_edge(c, d).unwrap();
        graph.remove_edge(c, d).unwrap();
        assert!(registry.remove_broken(&graph).is_empty());
        assert_eq!(registry.len(), 1);

        // Removing a boundary edge invalidates the fill.
        graph.remove_edge(a, b).unwrap();
        let removed = registry.remove_broken(&graph);
        assert_eq!(removed.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_broken_by_edge_reports_without_mutation() {
        let (_, a, b, c) = triangle_graph();
        let mut registry = FillRegistry::new();
        registry.set_fill(&[a, b, c], "#ff0000");

        assert_eq!(registry.broken_by_edge(b, a).len(), 1);
        // Wrapping pair c-a counts too.
        assert_eq!(registry.broken_by_edge(c, a).len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_apply_merge_rewrites_and_collapses() {
        let mut registry = FillRegistry::new();
        registry.set_fill(&[v(1), v(2), v(3), v(4)], "#ff0000");
        registry.set_fill(&[v(2), v(3), v(5)], "#00ff00");

        // Merging 2 into 3: the quad becomes a triangle {1,3,4}; the
        // triangle collapses to {3,5} and is deleted.
        let (deleted, rewritten) = registry.apply_merge(v(3), v(2));
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].color, "#00ff00");
        assert_eq!(rewritten, vec![(
            vec![v(1), v(2), v(3), v(4)],
            vec![v(1), v(3), v(4)],
        )]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.fills()[0].cycle, vec![v(1), v(3), v(4)]);
    }

    #[test]
    fn test_apply_split_inserts_vertex() {
        let mut registry = FillRegistry::new();
        registry.set_fill(&[v(1), v(2), v(3)], "#ff0000");

        let rewritten = registry.apply_split(v(2), v(1), v(9));
        assert_eq!(rewritten.len(), 1);
        assert_eq!(registry.fills()[0].cycle, vec![v(1), v(9), v(2), v(3)]);

        // A pair that is not consecutive on any boundary leaves fills untouched.
        assert!(registry.apply_split(v(9), v(3), v(10)).is_empty());
    }

    #[test]
    fn test_remove_for_vertex() {
        let mut registry = FillRegistry::new();
        registry.set_fill(&[v(1), v(2), v(3)], "#ff0000");
        registry.set_fill(&[v(4), v(5), v(6)], "#00ff00");

        let removed = registry.remove_for_vertex(v(2));
        assert_eq!(removed.len(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.fills()[0].color, "#00ff00");
    }
}
