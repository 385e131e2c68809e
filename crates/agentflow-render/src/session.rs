//! Interactive layout state: one graph, its latest layout, the view transform and the render
//! surface that shows them.
//!
//! Every layout pass tears down the previous surface before building a new one for the same
//! viewport. A surface that fails to construct leaves the session in
//! [`SessionStatus::Failed`] while the previous layout output stays readable.

use agentflow_core::{FlowGraph, LayoutMode};

use crate::external::ExternalLayout;
use crate::model::{LayoutPoint, LayoutedGraph};
use crate::viewport::{USER_ZOOM_BAND, ViewTransform, ViewportSize, fit_zoom};
use crate::{Error, LayoutOptions, Result, layout_graph_with};

pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;
/// Padding for the explicit fit action.
pub const FIT_ACTION_PADDING: f64 = 50.0;
/// The explicit fit action backs off a little from a tight fit.
pub const FIT_ACTION_SCALE: f64 = 0.8;

/// A stateful drawing target, e.g. an SVG document or a GPU canvas.
pub trait RenderSurface {
    /// Draws a freshly laid out graph.
    fn mount(&mut self, graph: &LayoutedGraph) -> Result<()>;

    /// Redraws the mounted graph under a new view transform.
    fn set_transform(&mut self, transform: &ViewTransform);

    /// Serialized form of the current frame, when the surface has one.
    fn snapshot(&self) -> Option<String> {
        None
    }

    fn teardown(&mut self) {}
}

pub trait SurfaceFactory {
    fn create(&mut self, viewport: ViewportSize) -> Result<Box<dyn RenderSurface>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Ready,
    Failed {
        message: String,
    },
}

pub struct LayoutSession {
    graph: FlowGraph,
    options: LayoutOptions,
    external: Option<Box<dyn ExternalLayout>>,
    factory: Option<Box<dyn SurfaceFactory>>,
    surface: Option<Box<dyn RenderSurface>>,
    output: Option<LayoutedGraph>,
    transform: ViewTransform,
    fullscreen: bool,
    status: SessionStatus,
}

impl std::fmt::Debug for LayoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutSession")
            .field("options", &self.options)
            .field("nodes", &self.graph.nodes.len())
            .field("transform", &self.transform)
            .field("fullscreen", &self.fullscreen)
            .field("status", &self.status)
            .field("has_surface", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}

impl LayoutSession {
    pub fn new(graph: FlowGraph, options: LayoutOptions) -> Self {
        Self {
            graph,
            options,
            external: None,
            factory: None,
            surface: None,
            output: None,
            transform: ViewTransform::identity(),
            fullscreen: false,
            status: SessionStatus::Idle,
        }
    }

    pub fn with_external_layout(mut self, engine: impl ExternalLayout + 'static) -> Self {
        self.external = Some(Box::new(engine));
        self
    }

    pub fn with_surface_factory(mut self, factory: impl SurfaceFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn output(&self) -> Option<&LayoutedGraph> {
        self.output.as_ref()
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn surface(&self) -> Option<&dyn RenderSurface> {
        self.surface.as_deref()
    }

    /// Replaces the graph and lays it out from scratch.
    pub fn set_graph(&mut self, graph: FlowGraph) -> Result<&LayoutedGraph> {
        self.graph = graph;
        self.relayout()
    }

    /// Recomputes every position, fits the viewport and remounts the surface.
    pub fn relayout(&mut self) -> Result<&LayoutedGraph> {
        let layout = self.run_layout()?;
        Ok(self.install(layout))
    }

    /// Relayouts for a new viewport. On failure the previous viewport is kept.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<&LayoutedGraph> {
        tracing::trace!(width, height, "resize");
        let previous = std::mem::replace(
            &mut self.options.viewport,
            ViewportSize::new(width, height),
        );
        match self.run_layout() {
            Ok(layout) => Ok(self.install(layout)),
            Err(err) => {
                self.options.viewport = previous;
                Err(err)
            }
        }
    }

    /// Relayouts with another mode. On failure the previous mode is kept.
    pub fn set_mode(&mut self, mode: LayoutMode) -> Result<&LayoutedGraph> {
        tracing::trace!(mode = mode.as_str(), "set layout mode");
        let previous = std::mem::replace(&mut self.options.mode, mode);
        match self.run_layout() {
            Ok(layout) => Ok(self.install(layout)),
            Err(err) => {
                self.options.mode = previous;
                Err(err)
            }
        }
    }

    fn run_layout(&mut self) -> Result<LayoutedGraph> {
        let layout = match layout_graph_with(&self.graph, &self.options, self.external.as_deref())
        {
            Ok(layout) => layout,
            Err(err) => {
                self.status = SessionStatus::Failed {
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        if let Some(mut old) = self.surface.take() {
            old.teardown();
        }
        if let Some(factory) = self.factory.as_mut() {
            let surface = factory
                .create(self.options.viewport)
                .and_then(|mut surface| surface.mount(&layout).map(|()| surface));
            match surface {
                Ok(surface) => self.surface = Some(surface),
                Err(err) => {
                    let message = match err {
                        Error::SurfaceInit { message } => message,
                        other => other.to_string(),
                    };
                    tracing::error!(%message, "render surface failed to initialize");
                    self.status = SessionStatus::Failed {
                        message: message.clone(),
                    };
                    return Err(Error::SurfaceInit { message });
                }
            }
        }
        Ok(layout)
    }

    fn install(&mut self, layout: LayoutedGraph) -> &LayoutedGraph {
        self.transform = layout.transform;
        self.status = SessionStatus::Ready;
        self.output.insert(layout)
    }

    pub fn zoom_in(&mut self) -> ViewTransform {
        self.zoom_by(ZOOM_IN_FACTOR)
    }

    pub fn zoom_out(&mut self) -> ViewTransform {
        self.zoom_by(ZOOM_OUT_FACTOR)
    }

    /// Scales the zoom around the viewport center, within the user zoom band.
    pub fn zoom_by(&mut self, factor: f64) -> ViewTransform {
        let zoom = USER_ZOOM_BAND.clamp(self.transform.zoom * factor);
        tracing::trace!(from = self.transform.zoom, to = zoom, "zoom");
        let next = self
            .transform
            .zoomed_at(zoom, self.options.viewport.center());
        self.apply_transform(next)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> ViewTransform {
        tracing::trace!(dx, dy, "pan");
        let next = self.transform.panned_by(dx, dy);
        self.apply_transform(next)
    }

    /// Zoom 1, centered on the graph.
    pub fn reset(&mut self) -> ViewTransform {
        tracing::trace!("reset view");
        let zoom = USER_ZOOM_BAND.clamp(1.0);
        let next = match self.output.as_ref().and_then(|o| o.bounds) {
            Some(bounds) => ViewTransform::centered_on(bounds.center(), self.options.viewport, zoom),
            None => ViewTransform {
                zoom,
                ..ViewTransform::identity()
            },
        };
        self.apply_transform(next)
    }

    /// Tight fit with [`FIT_ACTION_PADDING`], backed off by [`FIT_ACTION_SCALE`], centered.
    pub fn fit(&mut self) -> ViewTransform {
        tracing::trace!("fit view");
        let Some(bounds) = self.output.as_ref().and_then(|o| o.bounds) else {
            return self.transform;
        };
        let viewport = self.options.viewport;
        let tight = USER_ZOOM_BAND.clamp(
            fit_zoom(&bounds, viewport, FIT_ACTION_PADDING).unwrap_or(self.transform.zoom),
        );
        let zoom = USER_ZOOM_BAND.clamp(tight * FIT_ACTION_SCALE);
        let next = ViewTransform::centered_on(bounds.center(), viewport, zoom);
        self.apply_transform(next)
    }

    /// Relayouts for the new viewport size, flips fullscreen, then fits. A failed relayout
    /// leaves the flag and viewport unchanged.
    pub fn toggle_fullscreen(&mut self, width: f64, height: f64) -> Result<ViewTransform> {
        tracing::trace!(fullscreen = !self.fullscreen, "toggle fullscreen");
        self.resize(width, height)?;
        self.fullscreen = !self.fullscreen;
        Ok(self.fit())
    }

    pub fn screen_to_graph(&self, point: LayoutPoint) -> LayoutPoint {
        self.transform.screen_to_graph(point)
    }

    pub fn graph_to_screen(&self, point: LayoutPoint) -> LayoutPoint {
        self.transform.graph_to_screen(point)
    }

    fn apply_transform(&mut self, transform: ViewTransform) -> ViewTransform {
        self.transform = transform;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_transform(&transform);
        }
        transform
    }
}

impl Drop for LayoutSession {
    fn drop(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.teardown();
        }
    }
}
