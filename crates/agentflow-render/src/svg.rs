//! SVG rendering of a [`LayoutedGraph`].
//!
//! The output is a standalone document: node shapes filled per style class, labels as
//! `<text>` with one `<tspan>` per wrapped line, and straight edges clipped to the node boxes.

use std::fmt::Write as _;

use agentflow_core::{EdgeKind, EdgeStyle, NodeShape, NodeStyle, NodeType};

use crate::Result;
use crate::model::{Bounds, LayoutEdge, LayoutNode, LayoutPoint, LayoutedGraph};
use crate::session::{RenderSurface, SurfaceFactory};
use crate::viewport::{ViewTransform, ViewportSize};

const FONT_FAMILY: &str = "ui-sans-serif, system-ui, -apple-system, 'PingFang SC', 'Microsoft YaHei', sans-serif";
const LABEL_LINE_HEIGHT: f64 = 1.2;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Adds extra space around the computed viewBox.
    pub viewbox_padding: f64,
    /// Optional id for the root element; also prefixes marker ids.
    pub diagram_id: Option<String>,
    /// Fill for a full-size background rect. `None` leaves the canvas transparent.
    pub background: Option<String>,
    pub include_edges: bool,
    pub include_edge_labels: bool,
    /// When true the document is sized to the viewport and the layout's view transform is
    /// applied, so the SVG shows what the interactive view shows.
    pub apply_view_transform: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 20.0,
            diagram_id: None,
            background: None,
            include_edges: true,
            include_edge_labels: true,
            apply_view_transform: false,
        }
    }
}

pub fn render_layouted_svg(graph: &LayoutedGraph, options: &SvgRenderOptions) -> String {
    render_with_transform(graph, &graph.transform, options)
}

fn render_with_transform(
    graph: &LayoutedGraph,
    transform: &ViewTransform,
    options: &SvgRenderOptions,
) -> String {
    let id = options.diagram_id.as_deref().unwrap_or("agentflow");
    let mut out = String::new();

    let (vb_x, vb_y, vb_w, vb_h) = if options.apply_view_transform {
        (0.0, 0.0, graph.viewport.width, graph.viewport.height)
    } else {
        let b = graph.bounds.unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 100.0,
        });
        let pad = options.viewbox_padding.max(0.0);
        (
            b.min_x - pad,
            b.min_y - pad,
            b.width() + pad * 2.0,
            b.height() + pad * 2.0,
        )
    };
    let (vb_w, vb_h) = (vb_w.max(1.0), vb_h.max(1.0));

    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{}" height="{}" viewBox="{} {} {} {}" data-layout-mode="{}">"#,
        escape_xml(id),
        fmt(vb_w),
        fmt(vb_h),
        fmt(vb_x),
        fmt(vb_y),
        fmt(vb_w),
        fmt(vb_h),
        graph.mode.as_str()
    );
    write_defs(&mut out, id);
    if let Some(bg) = &options.background {
        let _ = writeln!(
            &mut out,
            r#"<rect class="background" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            fmt(vb_x),
            fmt(vb_y),
            fmt(vb_w),
            fmt(vb_h),
            escape_xml(bg)
        );
    }

    if options.apply_view_transform {
        let _ = writeln!(
            &mut out,
            r#"<g class="viewport" transform="translate({} {}) scale({})">"#,
            fmt(transform.pan_x),
            fmt(transform.pan_y),
            fmt(transform.zoom)
        );
    } else {
        out.push_str("<g class=\"viewport\">\n");
    }

    if options.include_edges {
        out.push_str(r#"<g class="edges">"#);
        for edge in &graph.edges {
            render_edge(&mut out, graph, edge, id, options.include_edge_labels);
        }
        out.push_str("</g>\n");
    }

    out.push_str(r#"<g class="nodes">"#);
    for node in &graph.nodes {
        render_node(&mut out, node);
    }
    out.push_str("</g>\n");

    out.push_str("</g>\n</svg>\n");
    out
}

fn write_defs(out: &mut String, id: &str) {
    out.push_str("<defs>");
    for kind in [EdgeKind::Default, EdgeKind::Hierarchy, EdgeKind::Error] {
        let style = EdgeStyle::for_kind(kind);
        let _ = write!(
            out,
            r#"<marker id="{}-arrow-{}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="{}"/></marker>"#,
            escape_xml(id),
            kind.as_str(),
            style.color
        );
    }
    out.push_str("</defs>\n");
}

fn render_edge(
    out: &mut String,
    graph: &LayoutedGraph,
    edge: &LayoutEdge,
    id: &str,
    include_label: bool,
) {
    let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
    else {
        tracing::debug!(edge = %edge.id, "skipping edge without both endpoints");
        return;
    };
    if source.id == target.id {
        return;
    }

    let kind = EdgeKind::parse(edge.edge_type.as_deref());
    let style = EdgeStyle::for_kind(kind);
    let start = clip_to_box(source, target.position);
    let end = clip_to_box(target, source.position);

    let _ = write!(
        out,
        r#"<line class="edge edge-{}" data-id="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}""#,
        kind.as_str(),
        escape_xml(&edge.id),
        fmt(start.x),
        fmt(start.y),
        fmt(end.x),
        fmt(end.y),
        style.color,
        fmt(style.width)
    );
    if style.dashed {
        out.push_str(r#" stroke-dasharray="6 4""#);
    }
    let _ = write!(
        out,
        r#" marker-end="url(#{}-arrow-{})"/>"#,
        escape_xml(id),
        kind.as_str()
    );

    if include_label {
        if let Some(label) = edge.label.as_deref().filter(|l| !l.trim().is_empty()) {
            let _ = write!(
                out,
                r#"<text class="edge-label" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-family="{}" font-size="{}" fill="{}">{}</text>"#,
                fmt((start.x + end.x) / 2.0),
                fmt((start.y + end.y) / 2.0),
                FONT_FAMILY,
                fmt(EdgeStyle::LABEL_FONT_SIZE),
                style.color,
                escape_xml(label)
            );
        }
    }
}

/// Point where the segment from `node`'s center toward `toward` leaves the node's box.
fn clip_to_box(node: &LayoutNode, toward: LayoutPoint) -> LayoutPoint {
    let c = node.position;
    let (dx, dy) = (toward.x - c.x, toward.y - c.y);
    if dx == 0.0 && dy == 0.0 {
        return c;
    }
    let (hw, hh) = (node.width / 2.0, node.height / 2.0);
    let tx = if dx != 0.0 { hw / dx.abs() } else { f64::INFINITY };
    let ty = if dy != 0.0 { hh / dy.abs() } else { f64::INFINITY };
    let t = tx.min(ty).min(1.0);
    LayoutPoint {
        x: c.x + dx * t,
        y: c.y + dy * t,
    }
}

fn render_node(out: &mut String, node: &LayoutNode) {
    let style = NodeType::parse(&node.style_class).style();
    let _ = write!(
        out,
        r#"<g class="node {}" data-id="{}">"#,
        escape_xml(&node.style_class),
        escape_xml(&node.id)
    );
    write_shape(out, node, &style);
    write_label(out, node, &style);
    out.push_str("</g>");
}

fn write_shape(out: &mut String, node: &LayoutNode, style: &NodeStyle) {
    let (cx, cy) = (node.position.x, node.position.y);
    let (w, h) = (node.width, node.height);
    let (l, t, r, b) = (cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0);
    let paint = format!(
        r#"fill="{}" stroke="{}" stroke-width="{}""#,
        style.fill,
        style.border,
        fmt(NodeStyle::BORDER_WIDTH)
    );

    match node.shape {
        NodeShape::Rectangle | NodeShape::RoundRectangle => {
            let radius = if node.shape == NodeShape::RoundRectangle {
                (w.min(h) * 0.1).min(16.0)
            } else {
                0.0
            };
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" {paint}/>"#,
                fmt(l),
                fmt(t),
                fmt(w),
                fmt(h),
                fmt(radius)
            );
        }
        NodeShape::Ellipse => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {paint}/>"#,
                fmt(cx),
                fmt(cy),
                fmt(w / 2.0),
                fmt(h / 2.0)
            );
        }
        NodeShape::Diamond => {
            write_polygon(out, &[(cx, t), (r, cy), (cx, b), (l, cy)], &paint);
        }
        NodeShape::Hexagon => {
            let q = w / 4.0;
            write_polygon(
                out,
                &[(l, cy), (l + q, t), (r - q, t), (r, cy), (r - q, b), (l + q, b)],
                &paint,
            );
        }
        NodeShape::Octagon => {
            let (ox, oy) = (w * 0.3, h * 0.3);
            write_polygon(
                out,
                &[
                    (l + ox, t),
                    (r - ox, t),
                    (r, t + oy),
                    (r, b - oy),
                    (r - ox, b),
                    (l + ox, b),
                    (l, b - oy),
                    (l, t + oy),
                ],
                &paint,
            );
        }
    }
}

fn write_polygon(out: &mut String, points: &[(f64, f64)], paint: &str) {
    out.push_str(r#"<polygon points=""#);
    for (idx, (x, y)) in points.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", fmt(*x), fmt(*y));
    }
    let _ = write!(out, r#"" {paint}/>"#);
}

fn write_label(out: &mut String, node: &LayoutNode, style: &NodeStyle) {
    if node.wrapped_label.is_empty() {
        return;
    }
    let lines = node.wrapped_label.split('\n').collect::<Vec<_>>();
    let line_height = style.font_size * LABEL_LINE_HEIGHT;
    let first_dy = -(lines.len() as f64 - 1.0) / 2.0 * line_height;
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-family="{}" font-size="{}" fill="{}" stroke="{}" stroke-width="1" paint-order="stroke">"#,
        fmt(node.position.x),
        fmt(node.position.y),
        FONT_FAMILY,
        fmt(style.font_size),
        NodeStyle::TEXT_COLOR,
        NodeStyle::TEXT_OUTLINE
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { first_dy } else { line_height };
        let _ = write!(
            out,
            r#"<tspan x="{}" dy="{}">{}</tspan>"#,
            fmt(node.position.x),
            fmt(dy),
            escape_xml(line)
        );
    }
    out.push_str("</text>");
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render surface that keeps the latest frame as an SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    options: SvgRenderOptions,
    graph: Option<LayoutedGraph>,
    document: Option<String>,
}

impl SvgSurface {
    pub fn new(options: SvgRenderOptions) -> Self {
        Self {
            options,
            graph: None,
            document: None,
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl RenderSurface for SvgSurface {
    fn mount(&mut self, graph: &LayoutedGraph) -> Result<()> {
        self.document = Some(render_layouted_svg(graph, &self.options));
        self.graph = Some(graph.clone());
        Ok(())
    }

    fn set_transform(&mut self, transform: &ViewTransform) {
        if let Some(graph) = &self.graph {
            self.document = Some(render_with_transform(graph, transform, &self.options));
        }
    }

    fn snapshot(&self) -> Option<String> {
        self.document.clone()
    }

    fn teardown(&mut self) {
        self.graph = None;
        self.document = None;
    }
}

/// Builds a fresh [`SvgSurface`] per layout pass. Frames track the view transform.
#[derive(Debug, Clone)]
pub struct SvgSurfaceFactory {
    pub options: SvgRenderOptions,
}

impl Default for SvgSurfaceFactory {
    fn default() -> Self {
        Self {
            options: SvgRenderOptions {
                apply_view_transform: true,
                ..SvgRenderOptions::default()
            },
        }
    }
}

impl SurfaceFactory for SvgSurfaceFactory {
    fn create(&mut self, _viewport: ViewportSize) -> Result<Box<dyn RenderSurface>> {
        Ok(Box::new(SvgSurface::new(self.options.clone())))
    }
}
