use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;
use crate::style::{EdgeKind, EdgeStyle, NodeStyle};

/// The step category of a trace node.
///
/// Every variant maps to exactly one style class. Types the parser emits that are not part of
/// the fixed enumeration are kept verbatim in [`NodeType::Unknown`] so the raw class name
/// survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Start,
    End,
    Action,
    Decision,
    Thinking,
    Result,
    Error,
    Tool,
    Info,
    Data,
    Metric,
    Other,
    Unknown(String),
}

impl Default for NodeType {
    fn default() -> Self {
        Self::Unknown("default".to_string())
    }
}

impl NodeType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "start" => Self::Start,
            "end" => Self::End,
            "action" => Self::Action,
            "decision" => Self::Decision,
            "thinking" => Self::Thinking,
            "result" => Self::Result,
            "error" => Self::Error,
            "tool" => Self::Tool,
            "info" => Self::Info,
            "data" => Self::Data,
            "metric" => Self::Metric,
            "other" => Self::Other,
            "" => Self::default(),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Style class name consumed by the render surface.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Action => "action",
            Self::Decision => "decision",
            Self::Thinking => "thinking",
            Self::Result => "result",
            Self::Error => "error",
            Self::Tool => "tool",
            Self::Info => "info",
            Self::Data => "data",
            Self::Metric => "metric",
            Self::Other => "other",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn style(&self) -> NodeStyle {
        NodeStyle::for_type(self)
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDetails {
    /// The complete source line the step was extracted from.
    #[serde(default)]
    pub full_content: Option<String>,
    #[serde(default)]
    pub line_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    /// Raw, unwrapped label text.
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<NodeDetails>,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            timestamp: None,
            details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "edgeType")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
}

impl FlowEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            edge_type: None,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        EdgeKind::parse(self.edge_type.as_deref())
    }

    pub fn style(&self) -> EdgeStyle {
        EdgeStyle::for_kind(self.kind())
    }
}

/// Informational metadata reported by the trace parser. It never affects layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default)]
    pub total_lines: Option<u64>,
    #[serde(default)]
    pub parsed_nodes: Option<u64>,
    #[serde(default)]
    pub detected_framework: Option<String>,
}

/// An agent execution trace: nodes in document order plus the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,
}

/// An edge whose endpoints both resolve to node indices.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEdge<'a> {
    pub edge: &'a FlowEdge,
    pub source: usize,
    pub target: usize,
}

impl FlowGraph {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maps node ids to their index in document order. The first occurrence of a duplicated id
    /// wins.
    pub fn node_index(&self) -> FxHashMap<&str, usize> {
        let mut index = FxHashMap::default();
        for (idx, node) in self.nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(idx);
        }
        index
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Splits edges into those that can be drawn and those referencing missing nodes.
    pub fn resolve_edges(&self) -> (Vec<ResolvedEdge<'_>>, Vec<&FlowEdge>) {
        let index = self.node_index();
        let mut resolved = Vec::with_capacity(self.edges.len());
        let mut dangling = Vec::new();
        for edge in &self.edges {
            match (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) {
                (Some(&source), Some(&target)) => resolved.push(ResolvedEdge {
                    edge,
                    source,
                    target,
                }),
                _ => dangling.push(edge),
            }
        }
        (resolved, dangling)
    }

    pub fn dangling_edges(&self) -> Vec<&FlowEdge> {
        self.resolve_edges().1
    }

    /// Ids that occur on more than one node, in order of first appearance.
    pub fn duplicate_node_ids(&self) -> Vec<&str> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for node in &self.nodes {
            *counts.entry(node.id.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect()
    }
}
