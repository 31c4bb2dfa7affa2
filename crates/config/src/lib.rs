//! Shared configuration for Skein
//!
//! This crate provides the single source of truth for editor tunables shared
//! between the diagram engine and its frontends: undo history depth, the
//! default fill color, and hit-test radii for interactive picking.

use serde::{Deserialize, Serialize};

/// Default number of undo steps kept before the oldest is evicted
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Default fill color offered by the color picker
pub const DEFAULT_FILL_COLOR: &str = "#3b82f6";

/// Default radius (in diagram units) within which a release snaps to a vertex
pub const DEFAULT_VERTEX_HIT_RADIUS: f64 = 8.0;

/// Default distance (in diagram units) within which a point counts as "on" an edge
pub const DEFAULT_EDGE_HIT_RADIUS: f64 = 6.0;

/// Editor configuration shared by the engine and frontends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum undo history depth (oldest entries are evicted past this)
    pub history_depth: usize,
    /// Fill color applied when the user has not picked one yet
    pub fill_color: String,
    /// Radius within which a drag release snaps onto an existing vertex
    pub vertex_hit_radius: f64,
    /// Distance within which a point is considered to lie on an edge body
    pub edge_hit_radius: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            vertex_hit_radius: DEFAULT_VERTEX_HIT_RADIUS,
            edge_hit_radius: DEFAULT_EDGE_HIT_RADIUS,
        }
    }
}

impl EditorConfig {
    /// Create a config with the given history depth and defaults elsewhere
    pub fn with_history_depth(history_depth: usize) -> Self {
        Self {
            history_depth,
            ..Self::default()
        }
    }

    /// Set the default fill color
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(config.fill_color, DEFAULT_FILL_COLOR);
        assert_eq!(config.vertex_hit_radius, DEFAULT_VERTEX_HIT_RADIUS);
    }

    #[test]
    fn test_with_history_depth() {
        let config = EditorConfig::with_history_depth(5);
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.fill_color, DEFAULT_FILL_COLOR);
    }

    #[test]
    fn test_with_fill_color() {
        let config = EditorConfig::default().with_fill_color("#ff0000");
        assert_eq!(config.fill_color, "#ff0000");
    }
}
