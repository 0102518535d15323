//! Globe Renderer
//!
//! Owns the drawing surface, the land dots and the rotation, and runs the
//! frame/interaction state machine:
//!
//! ```text
//!   Loading ──load_points──▶ AutoRotating ◀──resume delay──┐
//!      │                        │                          │
//!      └──fail──▶ Failed        └──pointer_down──▶ Dragging ┘
//!
//!   any state ──stop──▶ Destroyed
//! ```
//!
//! The host calls `frame` from its animation timer and forwards pointer
//! events. Every call is synchronous; after `stop` nothing paints again.

use serde::{Deserialize, Serialize};

use crate::graticule::Graticule;
use crate::interaction::{DEFAULT_DRAG_SENSITIVITY, DragSession};
use crate::land::SamplePoint;
use crate::projection::{OrthographicProjector, ScreenPoint};
use crate::rotation::{Rotation, RotationControl};
use crate::surface::DrawingSurface;
use crate::viewport::SurfaceLayout;

/// Colors used for each layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub ocean: String,
    pub outline: String,
    pub graticule: String,
    pub land: String,
    pub graticule_alpha: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ocean: "#ffffff".into(),
            outline: "#e2e8f0".into(),
            graticule: "#cbd5e1".into(),
            land: "#94a3b8".into(),
            graticule_alpha: 0.3,
        }
    }
}

/// Renderer tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlobeConfig {
    /// Longitude advance per frame while auto-rotating (degrees)
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,

    /// Rotation per dragged pixel (degrees)
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f64,

    /// Wait after pointer-up before auto-rotation resumes (ms)
    #[serde(default = "default_resume_delay")]
    pub resume_delay_ms: f64,

    /// Rotation when the widget mounts
    #[serde(default)]
    pub initial_rotation: Rotation,

    #[serde(default)]
    pub palette: Palette,

    #[serde(default)]
    pub graticule: Graticule,
}

const fn default_rotation_speed() -> f64 {
    0.2
}

const fn default_drag_sensitivity() -> f64 {
    DEFAULT_DRAG_SENSITIVITY
}

const fn default_resume_delay() -> f64 {
    10.0
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            rotation_speed: default_rotation_speed(),
            drag_sensitivity: default_drag_sensitivity(),
            resume_delay_ms: default_resume_delay(),
            initial_rotation: Rotation::default(),
            palette: Palette::default(),
            graticule: Graticule::default(),
        }
    }
}

/// Lifecycle state of the widget
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlobeState {
    /// Waiting for land dots; nothing is shown
    Loading,
    /// Frame timer owns the rotation
    AutoRotating,
    /// A pointer drag owns the rotation
    Dragging,
    /// Land data could not be obtained
    Failed(String),
    /// Torn down; no further paints
    Destroyed,
}

/// Frame-driven globe renderer over any drawing surface
pub struct GlobeRenderer<S: DrawingSurface> {
    surface: S,
    layout: SurfaceLayout,
    projector: OrthographicProjector,
    control: RotationControl,
    config: GlobeConfig,
    state: GlobeState,
    points: Vec<SamplePoint>,
    graticule_lines: Vec<Vec<(f64, f64)>>,
    drag: Option<DragSession>,
    running: bool,
    paints: u64,
}

impl<S: DrawingSurface> GlobeRenderer<S> {
    pub fn new(surface: S, layout: SurfaceLayout, config: GlobeConfig) -> Self {
        let mut projector = OrthographicProjector::new(layout.projection());
        projector.set_rotation(config.initial_rotation);

        Self {
            surface,
            layout,
            projector,
            control: RotationControl::new(config.initial_rotation),
            graticule_lines: config.graticule.lines(),
            config,
            state: GlobeState::Loading,
            points: Vec::new(),
            drag: None,
            running: false,
            paints: 0,
        }
    }

    pub const fn state(&self) -> &GlobeState {
        &self.state
    }

    pub const fn rotation(&self) -> Rotation {
        self.control.rotation()
    }

    pub const fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of full repaints so far
    pub const fn paint_count(&self) -> u64 {
        self.paints
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Begin accepting frames (host mount)
    pub fn start(&mut self) {
        if self.state == GlobeState::Destroyed || self.running {
            return;
        }
        self.running = true;
        tracing::debug!("Globe renderer started");
    }

    /// Stop for good (host unmount). Safe to call more than once.
    pub fn stop(&mut self) {
        if self.state == GlobeState::Destroyed {
            return;
        }
        self.running = false;
        self.drag = None;
        self.state = GlobeState::Destroyed;
        tracing::debug!("Globe renderer stopped after {} paints", self.paints);
    }

    /// Install the land dots and leave `Loading`.
    ///
    /// Only the first call counts; the dot set never changes afterwards.
    pub fn load_points(&mut self, points: Vec<SamplePoint>) -> bool {
        if self.state != GlobeState::Loading {
            return false;
        }
        self.points = points;
        self.state = GlobeState::AutoRotating;
        self.repaint();
        tracing::info!("Globe ready with {} land dots", self.points.len());
        true
    }

    /// Record that land data could not be obtained
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.state != GlobeState::Loading {
            return;
        }
        let message = message.into();
        tracing::warn!("Globe failed to load: {}", message);
        self.state = GlobeState::Failed(message);
    }

    /// Animation timer tick; `now` is the host's frame clock in ms.
    ///
    /// Returns whether a repaint happened.
    pub fn frame(&mut self, now: f64) -> bool {
        if !self.running {
            return false;
        }

        match self.state {
            GlobeState::AutoRotating => self.auto_rotate(),
            GlobeState::Dragging => {
                let due = self
                    .drag
                    .as_ref()
                    .is_some_and(|d| d.resume_due(now, self.config.resume_delay_ms));
                if !due {
                    return false;
                }
                self.drag = None;
                self.control.resume_auto();
                self.state = GlobeState::AutoRotating;
                tracing::debug!("Auto-rotation resumed");
                self.auto_rotate()
            }
            _ => false,
        }
    }

    /// Pointer pressed on the surface
    pub fn pointer_down(&mut self, pointer: ScreenPoint) {
        if !matches!(self.state, GlobeState::AutoRotating | GlobeState::Dragging) {
            return;
        }
        let start_rotation = self.control.begin_drag();
        self.drag = Some(DragSession::new(pointer, start_rotation));
        self.state = GlobeState::Dragging;
        tracing::debug!("Drag started at ({:.0}, {:.0})", pointer.0, pointer.1);
    }

    /// Pointer moved; returns whether a repaint happened
    pub fn pointer_move(&mut self, pointer: ScreenPoint) -> bool {
        if self.state != GlobeState::Dragging {
            return false;
        }
        let Some(drag) = self.drag.as_ref().filter(|d| !d.is_released()) else {
            return false;
        };

        let target = drag.target(pointer, self.config.drag_sensitivity);
        if !self.control.drag_to(target.lambda, target.phi) {
            return false;
        }
        self.projector.set_rotation(self.control.rotation());
        self.repaint();
        true
    }

    /// Pointer released; auto-rotation resumes after the configured delay
    pub fn pointer_up(&mut self, now: f64) {
        if self.state != GlobeState::Dragging {
            return;
        }
        if let Some(drag) = self.drag.as_mut().filter(|d| !d.is_released()) {
            drag.released_at = Some(now);
        }
    }

    /// Apply a new viewport layout
    pub fn resize(&mut self, layout: SurfaceLayout) {
        if self.state == GlobeState::Destroyed {
            return;
        }
        self.layout = layout;
        self.projector.set_config(layout.projection());
        if matches!(self.state, GlobeState::AutoRotating | GlobeState::Dragging) {
            self.repaint();
        }
    }

    fn auto_rotate(&mut self) -> bool {
        if !self.control.advance(self.config.rotation_speed) {
            return false;
        }
        self.projector.set_rotation(self.control.rotation());
        self.repaint();
        true
    }

    fn repaint(&mut self) {
        let scale = self.projector.scale();
        let factor = scale / self.layout.radius;
        let center = self.projector.config().translate;
        let palette = &self.config.palette;

        self.surface.clear(self.layout.width, self.layout.height);
        self.surface.fill_circle(center, scale, &palette.ocean);
        self.surface.stroke_circle(center, scale, &palette.outline, factor);

        let paths: Vec<Vec<ScreenPoint>> = self
            .graticule_lines
            .iter()
            .flat_map(|line| self.projector.project_line(line))
            .collect();
        self.surface
            .stroke_paths(&paths, &palette.graticule, 0.5 * factor, palette.graticule_alpha);

        for point in &self.points {
            if let Some(xy) = self.projector.project(point.lon, point.lat)
                && self.layout.contains(xy)
            {
                self.surface.fill_circle(xy, factor, &palette.land);
            }
        }

        self.paints += 1;
    }
}
