#![forbid(unsafe_code)]

//! Headless layout for agent execution traces.
//!
//! Pipeline: wrap each node label for its type, size the node, place every node (snake grid or
//! a delegated engine), then fit the viewport. [`session::LayoutSession`] keeps that state
//! together with a render surface for interactive use.

pub mod dimension;
pub mod external;
pub mod model;
pub mod session;
pub mod snake;
pub mod svg;
pub mod text;
pub mod viewport;

use std::sync::Arc;

use agentflow_core::{FlowConfig, FlowGraph, LayoutMode, NodeStyle, NodeType};

use crate::dimension::{NodeDimension, node_dimension};
use crate::external::{ExternalLayout, ExternalLayoutRequest, ExternalNode};
use crate::model::{Bounds, LayoutEdge, LayoutNode, LayoutedGraph};
use crate::snake::{DEFAULT_TOP_MARGIN, snake_layout};
use crate::text::{
    DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle, line_count, wrap_label,
};
use crate::viewport::{EXTERNAL_ZOOM_BAND, SNAKE_ZOOM_BAND, ViewportSize, fit_viewport};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] agentflow_core::Error),
    #[error("layout mode `{mode}` needs an external layout engine, none is configured")]
    ExternalLayoutUnavailable { mode: String },
    #[error("external layout for `{mode}` failed: {message}")]
    ExternalLayout { mode: String, message: String },
    #[error("visualization failed to initialize: {message}")]
    SurfaceInit { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fit padding used after the snake layout.
pub const DEFAULT_SNAKE_FIT_PADDING: f64 = 60.0;
/// Fit padding used after delegated layouts.
pub const DEFAULT_EXTERNAL_FIT_PADDING: f64 = 30.0;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub mode: LayoutMode,
    pub viewport: ViewportSize,
    pub top_margin: f64,
    pub snake_fit_padding: f64,
    pub external_fit_padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            mode: LayoutMode::default(),
            viewport: ViewportSize::default(),
            top_margin: DEFAULT_TOP_MARGIN,
            snake_fit_padding: DEFAULT_SNAKE_FIT_PADDING,
            external_fit_padding: DEFAULT_EXTERNAL_FIT_PADDING,
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("mode", &self.mode)
            .field("viewport", &self.viewport)
            .field("top_margin", &self.top_margin)
            .field("snake_fit_padding", &self.snake_fit_padding)
            .field("external_fit_padding", &self.external_fit_padding)
            .finish_non_exhaustive()
    }
}

impl LayoutOptions {
    /// Resolves options from a config. Fails only on an unknown `layout.mode`.
    pub fn from_config(config: &FlowConfig) -> Result<Self> {
        Ok(Self {
            mode: config.layout_mode()?,
            viewport: ViewportSize::new(config.viewport_width(), config.viewport_height()),
            top_margin: config.top_margin(),
            snake_fit_padding: config.snake_fit_padding(),
            external_fit_padding: config.external_fit_padding(),
            ..Self::default()
        })
    }

    pub fn with_mode(mut self, mode: LayoutMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = ViewportSize::new(width, height);
        self
    }
}

/// A node after wrapping and sizing, before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedNode {
    pub wrapped_label: String,
    pub line_count: usize,
    pub dimension: NodeDimension,
    pub label_metrics: TextMetrics,
}

pub fn prepare_node(label: &str, node_type: &NodeType, measurer: &dyn TextMeasurer) -> PreparedNode {
    let wrapped_label = wrap_label(label, node_type);
    let lines = line_count(&wrapped_label);
    let style = TextStyle::with_font_size(NodeStyle::for_type(node_type).font_size);
    PreparedNode {
        label_metrics: measurer.measure(&wrapped_label, &style),
        dimension: node_dimension(node_type, lines),
        line_count: lines,
        wrapped_label,
    }
}

pub fn prepare_nodes(graph: &FlowGraph, measurer: &dyn TextMeasurer) -> Vec<PreparedNode> {
    graph
        .nodes
        .iter()
        .map(|n| prepare_node(&n.label, &n.node_type, measurer))
        .collect()
}

/// Lays out `graph` with the snake grid. Delegated modes fail with
/// [`Error::ExternalLayoutUnavailable`]; use [`layout_graph_with`] to supply an engine.
pub fn layout_graph(graph: &FlowGraph, options: &LayoutOptions) -> Result<LayoutedGraph> {
    layout_graph_with(graph, options, None)
}

pub fn layout_graph_with(
    graph: &FlowGraph,
    options: &LayoutOptions,
    external: Option<&dyn ExternalLayout>,
) -> Result<LayoutedGraph> {
    let prepared = prepare_nodes(graph, options.text_measurer.as_ref());
    let dims = prepared.iter().map(|p| p.dimension).collect::<Vec<_>>();
    let (resolved, dangling) = graph.resolve_edges();

    for edge in &dangling {
        tracing::warn!(
            edge = %edge.id,
            source = %edge.source,
            target = %edge.target,
            "edge references a missing node; omitted from output"
        );
    }

    let (positions, grid, padding, band) = if options.mode.is_snake() {
        let snake = snake_layout(&dims, options.viewport.width, options.top_margin);
        (
            snake.positions,
            snake.grid,
            options.snake_fit_padding,
            SNAKE_ZOOM_BAND,
        )
    } else {
        let Some(engine) = external else {
            return Err(Error::ExternalLayoutUnavailable {
                mode: options.mode.as_str().to_string(),
            });
        };
        let request = ExternalLayoutRequest {
            mode: options.mode,
            viewport: options.viewport,
            nodes: graph
                .nodes
                .iter()
                .zip(&dims)
                .map(|(n, d)| ExternalNode {
                    id: n.id.as_str(),
                    width: d.width,
                    height: d.height,
                })
                .collect(),
            edges: resolved.iter().map(|e| (e.source, e.target)).collect(),
        };
        let positions = engine.layout(&request)?;
        if positions.len() != dims.len() {
            return Err(Error::ExternalLayout {
                mode: options.mode.as_str().to_string(),
                message: format!(
                    "expected {} positions, got {}",
                    dims.len(),
                    positions.len()
                ),
            });
        }
        (
            positions,
            None,
            options.external_fit_padding,
            EXTERNAL_ZOOM_BAND,
        )
    };

    let nodes = graph
        .nodes
        .iter()
        .zip(prepared)
        .zip(&positions)
        .map(|((node, prep), &position)| LayoutNode {
            id: node.id.clone(),
            position,
            width: prep.dimension.width,
            height: prep.dimension.height,
            wrapped_label: prep.wrapped_label,
            style_class: node.node_type.as_str().to_string(),
            shape: node.node_type.style().shape,
            label_metrics: prep.label_metrics,
        })
        .collect::<Vec<_>>();

    let bounds = node_bounds(&nodes);
    let transform = fit_viewport(bounds.as_ref(), options.viewport, padding, band);

    Ok(LayoutedGraph {
        mode: options.mode,
        viewport: options.viewport,
        edges: resolved
            .iter()
            .map(|r| LayoutEdge {
                id: r.edge.id.clone(),
                source: r.edge.source.clone(),
                target: r.edge.target.clone(),
                label: r.edge.label.clone(),
                edge_type: r.edge.edge_type.clone(),
            })
            .collect(),
        omitted_edges: dangling.iter().map(|e| e.id.clone()).collect(),
        nodes,
        bounds,
        grid,
        transform,
        metadata: graph.metadata.clone(),
    })
}

pub fn node_bounds(nodes: &[LayoutNode]) -> Option<Bounds> {
    Bounds::from_centered_rects(
        nodes
            .iter()
            .map(|n| (n.position.x, n.position.y, n.width, n.height)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutPoint;
    use agentflow_core::{FlowEdge, FlowNode};

    fn chain(n: usize) -> FlowGraph {
        FlowGraph {
            nodes: (0..n)
                .map(|i| FlowNode::new(format!("n{i}"), format!("step {i}"), NodeType::Action))
                .collect(),
            edges: (1..n)
                .map(|i| FlowEdge::new(format!("e{i}"), format!("n{}", i - 1), format!("n{i}")))
                .collect(),
            metadata: None,
        }
    }

    #[test]
    fn dangling_edges_are_reported_not_fatal() {
        let mut graph = chain(3);
        graph.edges.push(FlowEdge::new("ghost", "n2", "missing"));
        let out = layout_graph(&graph, &LayoutOptions::default()).unwrap();
        assert_eq!(out.nodes.len(), 3);
        assert_eq!(out.edges.len(), 2);
        assert_eq!(out.omitted_edges, vec!["ghost".to_string()]);
    }

    #[test]
    fn delegated_mode_without_engine_fails() {
        let options = LayoutOptions::default().with_mode(LayoutMode::Dagre);
        let err = layout_graph(&chain(2), &options).unwrap_err();
        assert!(matches!(err, Error::ExternalLayoutUnavailable { ref mode } if mode == "dagre"));
    }

    #[test]
    fn short_external_result_is_an_error() {
        struct Truncating;
        impl ExternalLayout for Truncating {
            fn layout(&self, _request: &ExternalLayoutRequest<'_>) -> Result<Vec<LayoutPoint>> {
                Ok(vec![LayoutPoint::default()])
            }
        }
        let options = LayoutOptions::default().with_mode(LayoutMode::Grid);
        let err = layout_graph_with(&chain(3), &options, Some(&Truncating)).unwrap_err();
        assert!(matches!(err, Error::ExternalLayout { .. }));
    }

    #[test]
    fn delegated_layout_uses_wider_zoom_band() {
        let options = LayoutOptions::default()
            .with_mode(LayoutMode::Grid)
            .with_viewport(4000.0, 3000.0);
        let out = layout_graph_with(&chain(1), &options, Some(&external::BuiltinLayouts::default()))
            .unwrap();
        assert!(out.grid.is_none());
        assert_eq!(out.transform.zoom, 2.0);

        let snake = layout_graph(&chain(1), &options.clone().with_mode(LayoutMode::Zigzag)).unwrap();
        assert_eq!(snake.transform.zoom, 0.9);
    }

    #[test]
    fn options_follow_config() {
        let config = FlowConfig::from_yaml_str("layout:\n  mode: smart\nviewport:\n  width: 1200\n")
            .unwrap();
        let options = LayoutOptions::from_config(&config).unwrap();
        assert_eq!(options.mode, LayoutMode::Smart);
        assert_eq!(options.viewport, ViewportSize::new(1200.0, 600.0));
        assert_eq!(options.top_margin, 150.0);
    }

    #[test]
    fn empty_graph_lays_out_to_nothing() {
        let out = layout_graph(&FlowGraph::default(), &LayoutOptions::default()).unwrap();
        assert!(out.nodes.is_empty());
        assert!(out.bounds.is_none());
        assert!(out.grid.is_none());
    }
}
