//! Visual classes for node and edge types.
//!
//! Shapes that render less usable width than a rectangle (diamond, hexagon, octagon, ellipse)
//! use a smaller font and a narrower label budget; see `agentflow_render::text::wrap`.

use serde::{Deserialize, Serialize};

use crate::model::NodeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    Rectangle,
    RoundRectangle,
    Diamond,
    Hexagon,
    Octagon,
    Ellipse,
}

impl NodeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::RoundRectangle => "round-rectangle",
            Self::Diamond => "diamond",
            Self::Hexagon => "hexagon",
            Self::Octagon => "octagon",
            Self::Ellipse => "ellipse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub fill: &'static str,
    pub border: &'static str,
    pub font_size: f64,
}

impl NodeStyle {
    pub const TEXT_COLOR: &'static str = "#fff";
    pub const TEXT_OUTLINE: &'static str = "#000";
    pub const BORDER_WIDTH: f64 = 2.0;

    pub fn for_type(node_type: &NodeType) -> Self {
        let (shape, fill, border) = match node_type {
            NodeType::Start => (NodeShape::RoundRectangle, "#4CAF50", "#388E3C"),
            NodeType::End => (NodeShape::RoundRectangle, "#F44336", "#D32F2F"),
            NodeType::Action => (NodeShape::Rectangle, "#2196F3", "#1976D2"),
            NodeType::Decision | NodeType::Thinking => {
                (NodeShape::Diamond, "#FF9800", "#F57C00")
            }
            NodeType::Result => (NodeShape::Rectangle, "#9C27B0", "#7B1FA2"),
            NodeType::Error => (NodeShape::Octagon, "#FF5722", "#E64A19"),
            NodeType::Tool => (NodeShape::Hexagon, "#607D8B", "#455A64"),
            NodeType::Info | NodeType::Data | NodeType::Metric | NodeType::Other => {
                (NodeShape::Ellipse, "#9E9E9E", "#757575")
            }
            NodeType::Unknown(_) => (NodeShape::Ellipse, "#666666", "#333333"),
        };
        let font_size = match node_type {
            NodeType::Start
            | NodeType::End
            | NodeType::Action
            | NodeType::Result
            | NodeType::Unknown(_) => 12.0,
            _ => 11.0,
        };
        Self {
            shape,
            fill,
            border,
            font_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Default,
    Hierarchy,
    Error,
}

impl EdgeKind {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("hierarchy") => Self::Hierarchy,
            Some("error") => Self::Error,
            _ => Self::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hierarchy => "hierarchy",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
}

impl EdgeStyle {
    pub const LABEL_FONT_SIZE: f64 = 10.0;

    pub fn for_kind(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::Default => Self {
                color: "#ccc",
                width: 2.0,
                dashed: false,
            },
            EdgeKind::Hierarchy => Self {
                color: "#aaa",
                width: 1.0,
                dashed: true,
            },
            EdgeKind::Error => Self {
                color: "#F44336",
                width: 2.0,
                dashed: true,
            },
        }
    }
}
