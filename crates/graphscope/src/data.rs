//! Graph element data as supplied by callers.

use glam::Vec2;
use graphscope_core::{ElementId, Result};
use graphscope_render::PickShape;
use serde::{Deserialize, Serialize};

fn default_node_size() -> f32 {
    1.0
}

fn default_edge_width() -> f32 {
    0.1
}

/// A node drawn as a square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Caller id reported in pick events.
    pub id: ElementId,
    /// Center in world space.
    pub position: Vec2,
    /// Side length in world units.
    #[serde(default = "default_node_size")]
    pub size: f32,
}

impl NodeData {
    /// Creates a node with the default size.
    pub fn new(id: impl Into<ElementId>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            size: default_node_size(),
        }
    }

    /// Sets the side length.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub(crate) fn pick_shape(&self) -> PickShape {
        PickShape::quad(self.position, Vec2::splat(self.size * 0.5))
    }
}

/// An edge drawn as a thick segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Caller id reported in pick events.
    pub id: ElementId,
    /// Start point in world space.
    pub source: Vec2,
    /// End point in world space.
    pub target: Vec2,
    /// Width in world units.
    #[serde(default = "default_edge_width")]
    pub width: f32,
}

impl EdgeData {
    /// Creates an edge with the default width.
    pub fn new(id: impl Into<ElementId>, source: Vec2, target: Vec2) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            width: default_edge_width(),
        }
    }

    pub(crate) fn pick_shape(&self) -> PickShape {
        PickShape::segment(self.source, self.target, self.width)
    }
}

/// A label's pickable box. Glyphs are drawn elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelData {
    /// Caller id reported in pick events.
    pub id: ElementId,
    /// Center of the label box in world space.
    pub position: Vec2,
    /// Full width and height of the label box.
    pub extent: Vec2,
}

impl LabelData {
    /// Creates a label box.
    pub fn new(id: impl Into<ElementId>, position: Vec2, extent: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            extent,
        }
    }

    pub(crate) fn pick_shape(&self) -> PickShape {
        PickShape::quad(self.position, self.extent * 0.5)
    }
}

/// The elements of one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphData {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<EdgeData>,
    pub labels: Vec<LabelData>,
}

impl GraphData {
    /// Parses graph data from JSON.
    ///
    /// ```
    /// use graphscope::GraphData;
    ///
    /// let data = GraphData::from_json_str(
    ///     r#"{ "nodes": [{ "id": "a", "position": [0.0, 1.0] }] }"#,
    /// ).unwrap();
    /// assert_eq!(data.nodes.len(), 1);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns true if there are no elements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let data = GraphData::from_json_str(
            r#"{
                "nodes": [{ "id": 1, "position": [0.0, 0.0] }],
                "edges": [{ "id": "e", "source": [0.0, 0.0], "target": [1.0, 0.0] }]
            }"#,
        )
        .unwrap();
        assert_eq!(data.nodes[0].id, ElementId::Number(1));
        assert!((data.nodes[0].size - 1.0).abs() < f32::EPSILON);
        assert!((data.edges[0].width - 0.1).abs() < f32::EPSILON);
        assert!(data.labels.is_empty());
        assert!(!data.is_empty());
    }

    #[test]
    fn test_pick_shapes() {
        let node = NodeData::new("n", Vec2::new(1.0, 2.0)).with_size(4.0);
        assert_eq!(
            node.pick_shape(),
            PickShape::quad(Vec2::new(1.0, 2.0), Vec2::splat(2.0))
        );
        let label = LabelData::new("l", Vec2::ZERO, Vec2::new(2.0, 1.0));
        assert_eq!(
            label.pick_shape(),
            PickShape::quad(Vec2::ZERO, Vec2::new(1.0, 0.5))
        );
    }
}
