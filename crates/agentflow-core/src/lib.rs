#![forbid(unsafe_code)]

//! Agent execution trace model (headless).
//!
//! The graph itself comes from an external trace parser; this crate only describes it:
//! typed nodes and edges, the visual class each type maps to, the layout-mode selector and
//! the layout configuration surface. Layout lives in `agentflow-render`.

pub mod config;
pub mod error;
pub mod layout_mode;
pub mod model;
pub mod style;

pub use config::FlowConfig;
pub use error::{Error, Result};
pub use layout_mode::LayoutMode;
pub use model::{
    FlowEdge, FlowGraph, FlowNode, GraphMetadata, NodeDetails, NodeType, ResolvedEdge,
};
pub use style::{EdgeKind, EdgeStyle, NodeShape, NodeStyle};

/// Parses the trace parser's JSON graph. Unknown fields are ignored.
pub fn parse_graph_json(text: &str) -> Result<FlowGraph> {
    let graph = FlowGraph::from_json_str(text)?;
    let duplicates = graph.duplicate_node_ids();
    if !duplicates.is_empty() {
        tracing::warn!(ids = ?duplicates, "trace graph has duplicate node ids");
    }
    Ok(graph)
}

#[cfg(test)]
mod tests;
