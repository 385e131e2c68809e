//! Delegated layout modes.
//!
//! `grid`, `circle`, `breadthfirst`, `dagre` and `cose-bilkent` are computed by an engine the
//! caller supplies through [`ExternalLayout`]. [`BuiltinLayouts`] covers the three geometric
//! modes; force-directed and layered modes need a real graph layout engine.

use std::collections::VecDeque;
use std::f64::consts::PI;

use agentflow_core::LayoutMode;
use rustc_hash::FxHashSet;

use crate::model::LayoutPoint;
use crate::viewport::ViewportSize;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalNode<'a> {
    pub id: &'a str,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct ExternalLayoutRequest<'a> {
    pub mode: LayoutMode,
    pub viewport: ViewportSize,
    /// Nodes in document order.
    pub nodes: Vec<ExternalNode<'a>>,
    /// Resolved `(source, target)` index pairs into `nodes`.
    pub edges: Vec<(usize, usize)>,
}

pub trait ExternalLayout {
    /// Returns one center position per request node, in request order.
    fn layout(&self, request: &ExternalLayoutRequest<'_>) -> Result<Vec<LayoutPoint>>;
}

/// Grid, circle and breadthfirst placement without an external engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLayouts {
    /// Gap between neighbouring nodes; `0` means 40px.
    pub spacing: f64,
}

impl BuiltinLayouts {
    fn spacing(&self) -> f64 {
        if self.spacing > 0.0 { self.spacing } else { 40.0 }
    }
}

impl ExternalLayout for BuiltinLayouts {
    fn layout(&self, request: &ExternalLayoutRequest<'_>) -> Result<Vec<LayoutPoint>> {
        if request.nodes.is_empty() {
            return Ok(Vec::new());
        }
        let (max_w, max_h) = request.nodes.iter().fold((0.0_f64, 0.0_f64), |(w, h), n| {
            (w.max(n.width), h.max(n.height))
        });
        let cell_w = max_w + self.spacing();
        let cell_h = max_h + self.spacing();

        match request.mode {
            LayoutMode::Grid => Ok(grid_positions(request, cell_w, cell_h)),
            LayoutMode::Circle => Ok(circle_positions(request.nodes.len(), cell_w.max(cell_h))),
            LayoutMode::Breadthfirst => Ok(breadthfirst_positions(request, cell_w, cell_h)),
            mode => Err(Error::ExternalLayoutUnavailable {
                mode: mode.as_str().to_string(),
            }),
        }
    }
}

/// Fills a near-square grid whose aspect follows the viewport.
fn grid_positions(request: &ExternalLayoutRequest<'_>, cell_w: f64, cell_h: f64) -> Vec<LayoutPoint> {
    let n = request.nodes.len();
    let aspect = if request.viewport.height > 0.0 && request.viewport.width > 0.0 {
        request.viewport.width / request.viewport.height
    } else {
        1.0
    };
    let cols = ((n as f64 * aspect * cell_h / cell_w).sqrt().round() as usize).clamp(1, n);
    (0..n)
        .map(|i| LayoutPoint {
            x: (i % cols) as f64 * cell_w + cell_w / 2.0,
            y: (i / cols) as f64 * cell_h + cell_h / 2.0,
        })
        .collect()
}

/// Places nodes clockwise from twelve o'clock on a circle large enough that neighbours don't
/// touch.
fn circle_positions(n: usize, cell: f64) -> Vec<LayoutPoint> {
    if n == 1 {
        return vec![LayoutPoint { x: 0.0, y: 0.0 }];
    }
    let step = 2.0 * PI / n as f64;
    // Chord between neighbours must be at least one cell.
    let radius = (cell / (2.0 * (step / 2.0).sin())).max(cell);
    (0..n)
        .map(|i| {
            let theta = -PI / 2.0 + i as f64 * step;
            LayoutPoint {
                x: radius * theta.cos(),
                y: radius * theta.sin(),
            }
        })
        .collect()
}

/// Rows by BFS depth from the roots (nodes without incoming edges, or the first node when
/// every node has one). Unreached nodes start new trees in document order.
fn breadthfirst_positions(
    request: &ExternalLayoutRequest<'_>,
    cell_w: f64,
    cell_h: f64,
) -> Vec<LayoutPoint> {
    let n = request.nodes.len();
    let mut children = vec![Vec::new(); n];
    let mut has_parent = vec![false; n];
    let mut seen = FxHashSet::default();
    for &(s, t) in &request.edges {
        if s < n && t < n && s != t && seen.insert((s, t)) {
            children[s].push(t);
            has_parent[t] = true;
        }
    }

    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();
    let roots = (0..n).filter(|&i| !has_parent[i]).collect::<Vec<_>>();
    let seeds = if roots.is_empty() { vec![0] } else { roots };
    let mut pending = seeds.into_iter().chain(0..n);

    loop {
        if queue.is_empty() {
            let Some(next) = pending.by_ref().find(|&i| depth[i].is_none()) else {
                break;
            };
            depth[next] = Some(0);
            queue.push_back(next);
        }
        while let Some(i) = queue.pop_front() {
            let d = depth[i].unwrap_or(0);
            for &c in &children[i] {
                if depth[c].is_none() {
                    depth[c] = Some(d + 1);
                    queue.push_back(c);
                }
            }
        }
    }

    let mut next_col: Vec<usize> = Vec::new();
    depth
        .into_iter()
        .map(|d| {
            let d = d.unwrap_or(0);
            if next_col.len() <= d {
                next_col.resize(d + 1, 0);
            }
            let col = next_col[d];
            next_col[d] += 1;
            LayoutPoint {
                x: col as f64 * cell_w + cell_w / 2.0,
                y: d as f64 * cell_h + cell_h / 2.0,
            }
        })
        .collect()
}
