use agentflow_core::NodeType;
use serde::{Deserialize, Serialize};

/// Extra height per wrapped line beyond the first.
pub const LINE_HEIGHT_STEP: f64 = 20.0;
pub const MAX_NODE_HEIGHT: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDimension {
    pub width: f64,
    pub height: f64,
}

pub fn base_dimension(node_type: &NodeType) -> NodeDimension {
    let (width, height) = match node_type {
        NodeType::Decision | NodeType::Thinking => (340.0, 200.0),
        NodeType::Error
        | NodeType::Tool
        | NodeType::Info
        | NodeType::Data
        | NodeType::Metric
        | NodeType::Other => (330.0, 190.0),
        NodeType::Start
        | NodeType::End
        | NodeType::Action
        | NodeType::Result
        | NodeType::Unknown(_) => (320.0, 180.0),
    };
    NodeDimension { width, height }
}

/// Rendered size of a node with `line_count` wrapped label lines.
///
/// Width is fixed per type; extra lines only grow the height, up to [`MAX_NODE_HEIGHT`].
pub fn node_dimension(node_type: &NodeType, line_count: usize) -> NodeDimension {
    let mut dim = base_dimension(node_type);
    if line_count > 1 {
        let extra = (line_count - 1) as f64 * LINE_HEIGHT_STEP;
        dim.height = (dim.height + extra).min(MAX_NODE_HEIGHT);
    }
    dim
}
