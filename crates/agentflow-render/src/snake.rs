//! Snake ("zigzag") grid layout.
//!
//! Every node gets a cell sized from the largest node in the set. Cells fill rows left to
//! right on even rows and right to left on odd rows, so consecutive steps stay adjacent when
//! the path wraps onto the next row. Uniform cells waste some space around small nodes but make
//! overlap impossible by construction.

use serde::{Deserialize, Serialize};

use crate::dimension::NodeDimension;
use crate::model::LayoutPoint;

/// Vertical space reserved above the first row for toolbar chrome.
pub const DEFAULT_TOP_MARGIN: f64 = 150.0;
pub const MIN_NODES_PER_ROW: usize = 2;

const MIN_HORIZONTAL_PADDING: f64 = 20.0;
const HORIZONTAL_PADDING_RATIO: f64 = 0.08;
const MIN_VERTICAL_PADDING: f64 = 30.0;
const VERTICAL_PADDING_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub row: usize,
    /// Column on screen, after mirroring odd rows.
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeGrid {
    pub viewport_width: f64,
    pub max_node_width: f64,
    pub max_node_height: f64,
    pub horizontal_padding: f64,
    pub vertical_padding: f64,
    pub cell_width: f64,
    pub nodes_per_row: usize,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub top_margin: f64,
}

impl SnakeGrid {
    /// Sizes the grid for `dims`. Returns `None` for an empty node set.
    pub fn compute(dims: &[NodeDimension], viewport_width: f64, top_margin: f64) -> Option<Self> {
        if dims.is_empty() {
            return None;
        }

        let viewport_width = sanitize_viewport_width(viewport_width);
        let max_node_width = dims.iter().map(|d| d.width).fold(0.0, f64::max);
        let max_node_height = dims.iter().map(|d| d.height).fold(0.0, f64::max);

        let horizontal_padding =
            MIN_HORIZONTAL_PADDING.max(max_node_width * HORIZONTAL_PADDING_RATIO);
        let vertical_padding = MIN_VERTICAL_PADDING.max(max_node_height * VERTICAL_PADDING_RATIO);

        let cell_width = max_node_width + horizontal_padding;
        let nodes_per_row = ((viewport_width / cell_width).floor() as usize).max(MIN_NODES_PER_ROW);
        let horizontal_spacing = cell_width.max(viewport_width / (nodes_per_row + 1) as f64);
        let vertical_spacing = max_node_height + vertical_padding;

        Some(Self {
            viewport_width,
            max_node_width,
            max_node_height,
            horizontal_padding,
            vertical_padding,
            cell_width,
            nodes_per_row,
            horizontal_spacing,
            vertical_spacing,
            top_margin: if top_margin.is_finite() {
                top_margin
            } else {
                DEFAULT_TOP_MARGIN
            },
        })
    }

    pub fn slot(&self, index: usize) -> GridSlot {
        let row = index / self.nodes_per_row;
        let col = index % self.nodes_per_row;
        let col = if row % 2 == 0 {
            col
        } else {
            self.nodes_per_row - 1 - col
        };
        GridSlot { row, col }
    }

    /// Center of the cell for the node at sequence `index`.
    pub fn position(&self, index: usize) -> LayoutPoint {
        let GridSlot { row, col } = self.slot(index);
        LayoutPoint {
            x: col as f64 * self.horizontal_spacing + self.horizontal_spacing / 2.0,
            y: row as f64 * self.vertical_spacing + self.top_margin,
        }
    }

    pub fn row_count(&self, node_count: usize) -> usize {
        node_count.div_ceil(self.nodes_per_row)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakeLayout {
    pub grid: Option<SnakeGrid>,
    pub positions: Vec<LayoutPoint>,
}

/// Places `dims.len()` nodes in sequence order. Never fails; an empty input yields no positions.
pub fn snake_layout(dims: &[NodeDimension], viewport_width: f64, top_margin: f64) -> SnakeLayout {
    let Some(grid) = SnakeGrid::compute(dims, viewport_width, top_margin) else {
        return SnakeLayout {
            grid: None,
            positions: Vec::new(),
        };
    };

    tracing::debug!(
        viewport_width = grid.viewport_width,
        nodes_per_row = grid.nodes_per_row,
        horizontal_spacing = grid.horizontal_spacing,
        vertical_spacing = grid.vertical_spacing,
        max_node_width = grid.max_node_width,
        max_node_height = grid.max_node_height,
        total_nodes = dims.len(),
        "snake layout grid"
    );

    let positions = (0..dims.len()).map(|i| grid.position(i)).collect();
    SnakeLayout {
        grid: Some(grid),
        positions,
    }
}

/// Zero, negative and non-finite widths become 1px so the grid math never divides by zero.
fn sanitize_viewport_width(width: f64) -> f64 {
    if width.is_finite() { width.max(1.0) } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, width: f64, height: f64) -> Vec<NodeDimension> {
        vec![NodeDimension { width, height }; n]
    }

    #[test]
    fn seven_nodes_three_per_row_snake() {
        // 1100 / (320 + 25.6) = 3.18 -> 3 columns.
        let grid = SnakeGrid::compute(&uniform(7, 320.0, 180.0), 1100.0, 150.0).unwrap();
        assert_eq!(grid.nodes_per_row, 3);
        let slots = (0..7)
            .map(|i| {
                let s = grid.slot(i);
                (s.row, s.col)
            })
            .collect::<Vec<_>>();
        assert_eq!(
            slots,
            vec![(0, 0), (0, 1), (0, 2), (1, 2), (1, 1), (1, 0), (2, 0)]
        );
    }

    #[test]
    fn twelve_nodes_in_1200px_viewport() {
        let layout = snake_layout(&uniform(12, 320.0, 180.0), 1200.0, DEFAULT_TOP_MARGIN);
        let grid = layout.grid.unwrap();

        assert!((grid.horizontal_padding - 25.6).abs() < 1e-9);
        assert_eq!(grid.vertical_padding, 36.0);
        assert_eq!(grid.nodes_per_row, 3);
        assert_eq!(grid.row_count(12), 4);
        assert!((grid.horizontal_spacing - 345.6).abs() < 1e-9);
        assert_eq!(grid.vertical_spacing, 216.0);

        let p = &layout.positions;
        assert_eq!(p.len(), 12);
        assert!((p[0].x - 172.8).abs() < 1e-9);
        assert_eq!(p[0].y, 150.0);
        // Row 1 runs right to left: index 3 sits under index 2.
        assert!((p[3].x - p[2].x).abs() < 1e-9);
        assert_eq!(p[3].y, 366.0);
        assert!((p[5].x - p[0].x).abs() < 1e-9);
        // Row 3 runs right to left again.
        assert!((p[9].x - p[2].x).abs() < 1e-9);
        assert!((p[11].x - p[0].x).abs() < 1e-9);
        assert_eq!(p[11].y, 150.0 + 3.0 * 216.0);
    }

    #[test]
    fn spacing_never_drops_below_cell_width() {
        // 2000 / 345.6 = 5.78 -> 5 columns; 2000 / 6 = 333.3 < 345.6 keeps the cell width.
        let grid = SnakeGrid::compute(&uniform(3, 320.0, 180.0), 2000.0, 150.0).unwrap();
        assert_eq!(grid.nodes_per_row, 5);
        assert!((grid.horizontal_spacing - 345.6).abs() < 1e-9);

        // Narrow viewport: 2 columns forced, spacing = max(345.6, 500 / 3).
        let grid = SnakeGrid::compute(&uniform(3, 320.0, 180.0), 500.0, 150.0).unwrap();
        assert_eq!(grid.nodes_per_row, 2);
        assert!((grid.horizontal_spacing - 345.6).abs() < 1e-9);

        // floor(w / cell) columns always leave less than one cell of slack, so the even share
        // never beats the cell width: 1040 / 345.6 = 3.01 -> 3 columns, 1040 / 4 = 260.
        let grid = SnakeGrid::compute(&uniform(3, 320.0, 180.0), 1040.0, 150.0).unwrap();
        assert_eq!(grid.nodes_per_row, 3);
        assert!((grid.horizontal_spacing - 345.6).abs() < 1e-9);
    }

    #[test]
    fn largest_node_sizes_the_cells() {
        let dims = vec![
            NodeDimension {
                width: 320.0,
                height: 180.0,
            },
            NodeDimension {
                width: 340.0,
                height: 300.0,
            },
        ];
        let grid = SnakeGrid::compute(&dims, 800.0, 150.0).unwrap();
        assert_eq!(grid.max_node_width, 340.0);
        assert_eq!(grid.max_node_height, 300.0);
        assert!((grid.horizontal_padding - 27.2).abs() < 1e-9);
        assert!((grid.vertical_padding - 60.0).abs() < 1e-9);
        assert!((grid.vertical_spacing - 360.0).abs() < 1e-9);
    }

    #[test]
    fn small_nodes_use_minimum_padding() {
        let grid = SnakeGrid::compute(&uniform(1, 100.0, 50.0), 800.0, 0.0).unwrap();
        assert_eq!(grid.horizontal_padding, 20.0);
        assert_eq!(grid.vertical_padding, 30.0);
    }

    #[test]
    fn degenerate_inputs() {
        let empty = snake_layout(&[], 1200.0, 150.0);
        assert!(empty.grid.is_none());
        assert!(empty.positions.is_empty());

        let single = snake_layout(&uniform(1, 320.0, 180.0), 1200.0, 150.0);
        assert_eq!(single.grid.unwrap().nodes_per_row, 3);
        assert_eq!(single.grid.unwrap().slot(0), GridSlot { row: 0, col: 0 });

        for width in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let layout = snake_layout(&uniform(4, 320.0, 180.0), width, 150.0);
            let grid = layout.grid.unwrap();
            assert_eq!(grid.viewport_width, 1.0);
            assert_eq!(grid.nodes_per_row, 2);
            assert!(layout.positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        }
    }
}
