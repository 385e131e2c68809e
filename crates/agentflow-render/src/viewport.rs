//! Viewport fitting: choose a zoom and pan so the laid-out graph is visible and legible.
//!
//! Screen coordinates relate to graph coordinates by `screen = graph * zoom + pan`.

use serde::{Deserialize, Serialize};

use crate::model::{Bounds, LayoutPoint};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBand {
    pub min: f64,
    pub max: f64,
}

impl ZoomBand {
    pub fn clamp(self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

/// Legibility band after a snake layout: never zoom in past 0.9 so cells stay comparable.
pub const SNAKE_ZOOM_BAND: ZoomBand = ZoomBand { min: 0.3, max: 0.9 };
/// Delegated layouts are typically sparser and may zoom in further.
pub const EXTERNAL_ZOOM_BAND: ZoomBand = ZoomBand { min: 0.3, max: 2.0 };
/// Limits for explicit user zoom actions.
pub const USER_ZOOM_BAND: ZoomBand = ZoomBand { min: 0.1, max: 5.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }

    /// Transform at `zoom` that puts `point` in the middle of the viewport.
    pub fn centered_on(point: LayoutPoint, viewport: ViewportSize, zoom: f64) -> Self {
        Self {
            pan_x: viewport.width / 2.0 - point.x * zoom,
            pan_y: viewport.height / 2.0 - point.y * zoom,
            zoom,
        }
    }

    pub fn graph_to_screen(&self, p: LayoutPoint) -> LayoutPoint {
        LayoutPoint {
            x: p.x * self.zoom + self.pan_x,
            y: p.y * self.zoom + self.pan_y,
        }
    }

    pub fn screen_to_graph(&self, p: LayoutPoint) -> LayoutPoint {
        LayoutPoint {
            x: (p.x - self.pan_x) / self.zoom,
            y: (p.y - self.pan_y) / self.zoom,
        }
    }

    /// Changes zoom while keeping the graph point under `anchor` (screen space) fixed.
    pub fn zoomed_at(&self, zoom: f64, anchor: LayoutPoint) -> Self {
        let ratio = zoom / self.zoom;
        Self {
            pan_x: anchor.x - (anchor.x - self.pan_x) * ratio,
            pan_y: anchor.y - (anchor.y - self.pan_y) * ratio,
            zoom,
        }
    }

    pub fn panned_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            zoom: self.zoom,
        }
    }
}

/// Largest zoom at which `bounds` fits inside `viewport` with `padding` on every side.
///
/// Returns `None` when the bounds have no area to fit.
pub fn fit_zoom(bounds: &Bounds, viewport: ViewportSize, padding: f64) -> Option<f64> {
    let (w, h) = (bounds.width(), bounds.height());
    if !(w.is_finite() && h.is_finite()) || (w <= 0.0 && h <= 0.0) {
        return None;
    }
    let padding = padding.max(0.0);
    let avail_w = (viewport.width - 2.0 * padding).max(1.0);
    let avail_h = (viewport.height - 2.0 * padding).max(1.0);
    let zx = if w > 0.0 { avail_w / w } else { f64::INFINITY };
    let zy = if h > 0.0 { avail_h / h } else { f64::INFINITY };
    Some(zx.min(zy))
}

/// Fits `bounds` into `viewport`, clamps the zoom to `band` and centers on the bounds.
///
/// Without bounds (no nodes) the identity zoom is clamped and the viewport is left uncentered.
pub fn fit_viewport(
    bounds: Option<&Bounds>,
    viewport: ViewportSize,
    padding: f64,
    band: ZoomBand,
) -> ViewTransform {
    let Some(bounds) = bounds else {
        return ViewTransform {
            zoom: band.clamp(1.0),
            ..ViewTransform::identity()
        };
    };
    let zoom = band.clamp(fit_zoom(bounds, viewport, padding).unwrap_or(1.0));
    let transform = ViewTransform::centered_on(bounds.center(), viewport, zoom);
    tracing::debug!(
        zoom = transform.zoom,
        pan_x = transform.pan_x,
        pan_y = transform.pan_y,
        "viewport fit"
    );
    transform
}
