#![forbid(unsafe_code)]

//! `agentflow` turns an agent execution trace into a readable picture.
//!
//! The trace graph (nodes in document order plus edges) comes from an external parser. This
//! crate wraps node labels per type, sizes nodes, places them on a snake grid and fits the
//! viewport.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`agentflow::render`)
//! - `raster`: enable PNG output via pure-Rust SVG rasterization

pub use agentflow_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use agentflow_render::external::{
        BuiltinLayouts, ExternalLayout, ExternalLayoutRequest, ExternalNode,
    };
    pub use agentflow_render::model::{
        Bounds, LayoutEdge, LayoutNode, LayoutPoint, LayoutedGraph,
    };
    pub use agentflow_render::session::{
        LayoutSession, RenderSurface, SessionStatus, SurfaceFactory,
    };
    pub use agentflow_render::svg::{SvgRenderOptions, SvgSurface, SvgSurfaceFactory};
    pub use agentflow_render::text::{DeterministicTextMeasurer, TextMeasurer, wrap_label};
    pub use agentflow_render::viewport::{ViewTransform, ViewportSize};
    pub use agentflow_render::{LayoutOptions, layout_graph, layout_graph_with};

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] agentflow_core::Error),
        #[error(transparent)]
        Render(#[from] agentflow_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Parses trace JSON and lays it out. Delegated modes use [`BuiltinLayouts`].
    pub fn layout_graph_json(text: &str, options: &LayoutOptions) -> Result<LayoutedGraph> {
        let graph = agentflow_core::parse_graph_json(text)?;
        Ok(layout_graph_with(&graph, options, Some(&BuiltinLayouts::default()))?)
    }

    pub fn render_svg_json(
        text: &str,
        options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let layout = layout_graph_json(text, options)?;
        Ok(agentflow_render::svg::render_layouted_svg(&layout, svg_options))
    }

    /// Bundles layout and SVG options for repeated headless renders.
    #[derive(Clone, Default)]
    pub struct HeadlessRenderer {
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, config: &agentflow_core::FlowConfig) -> Result<Self> {
            self.layout = LayoutOptions::from_config(config)?;
            Ok(self)
        }

        pub fn layout_json(&self, text: &str) -> Result<LayoutedGraph> {
            layout_graph_json(text, &self.layout)
        }

        pub fn render_svg_json(&self, text: &str) -> Result<String> {
            render_svg_json(text, &self.layout, &self.svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_json(
            &self,
            text: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            let svg = self.render_svg_json(text)?;
            raster::svg_to_png(&svg, raster)
        }
    }
}
