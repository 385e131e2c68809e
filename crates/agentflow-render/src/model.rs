use agentflow_core::{GraphMetadata, LayoutMode, NodeShape};
use serde::{Deserialize, Serialize};

use crate::snake::SnakeGrid;
use crate::text::TextMetrics;
use crate::viewport::{ViewTransform, ViewportSize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Bounding box of center-anchored rectangles `(cx, cy, width, height)`.
    pub fn from_centered_rects(rects: impl IntoIterator<Item = (f64, f64, f64, f64)>) -> Option<Self> {
        Self::from_points(rects.into_iter().flat_map(|(cx, cy, w, h)| {
            [
                (cx - w / 2.0, cy - h / 2.0),
                (cx + w / 2.0, cy + h / 2.0),
            ]
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> LayoutPoint {
        LayoutPoint {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// A node ready for the render surface. `position` is the node center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub position: LayoutPoint,
    pub width: f64,
    pub height: f64,
    pub wrapped_label: String,
    pub style_class: String,
    pub shape: NodeShape,
    pub label_metrics: TextMetrics,
}

/// Edges carry no geometry of their own; they are drawn between their endpoints' positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutedGraph {
    pub mode: LayoutMode,
    pub viewport: ViewportSize,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    /// Ids of edges that reference a missing node and were left out of `edges`.
    #[serde(default)]
    pub omitted_edges: Vec<String>,
    pub bounds: Option<Bounds>,
    /// Grid metrics when the snake layout placed the nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<SnakeGrid>,
    pub transform: ViewTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,
}

impl LayoutedGraph {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
