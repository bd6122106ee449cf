//! Interactive model viewport.
//!
//! [`ViewportState`] owns the displayed mesh, its rotation, the camera and
//! the active drag gesture. All mutation goes through [`ViewportState::handle`]
//! and [`ViewportState::render`], which a host calls from one serialized
//! input/frame loop; a [`RenderSurface`] implementation does the drawing.
//!
//! ```text
//!            load(model)
//!   Empty ───────────────▶ Loaded ──┐ frame: yaw += step (unless dragging)
//!     ▲                     │  ▲    │ drag:  yaw/pitch += delta * sensitivity
//!     └──────── reset ──────┘  └────┘ wheel: distance in [min, max]
//! ```

use nalgebra::{Matrix4, Point2};
use tracing::{debug, warn};

use crate::geometry::Mesh;
use crate::model::ParsedModel;
use crate::projection::Camera;
use crate::transform::{RotationState, Transform};

/// Tunable constants of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// Yaw added per rendered frame while idle, in radians.
    pub auto_rotate_step: f32,
    /// Radians of rotation per pointer unit of drag.
    pub drag_sensitivity: f32,
    /// Camera distance change per wheel unit.
    pub zoom_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    /// Bounding-sphere radius the model is scaled to.
    pub fit_radius: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            auto_rotate_step: 0.005,
            drag_sensitivity: 0.01,
            zoom_factor: 0.5,
            min_distance: 50.0,
            max_distance: 500.0,
            initial_distance: 200.0,
            fit_radius: 80.0,
        }
    }
}

/// Surface color of the displayed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the `#` is optional).
    pub fn from_hex(code: &str) -> Option<Self> {
        let hex = code.strip_prefix('#').unwrap_or(code);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Scale every channel by `factor` in `[0, 1]`.
    pub fn shade(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (f32::from(c) * f).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Output surface size in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Input delivered to the viewport by the host loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Pointer left the surface; ends any drag.
    PointerLeave,
    /// Positive `delta_y` moves the camera away.
    Wheel { delta_y: f32 },
    Resize { width: u32, height: u32 },
    /// New surface color as `#RRGGBB`.
    Color(String),
}

/// Whether a model is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportPhase {
    Empty,
    Loaded,
}

/// Everything a surface needs to draw one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    pub mesh: &'a Mesh,
    pub model_matrix: Matrix4<f32>,
    pub camera: &'a Camera,
    pub color: Rgb,
    pub size: SurfaceSize,
}

/// Drawing backend driven by [`ViewportState::render`].
pub trait RenderSurface {
    type Error;

    /// Draw a loaded model.
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;

    /// Draw the placeholder shown before a model is loaded.
    fn draw_empty(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        let _ = size;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Scene {
    mesh: Mesh,
    rotation: RotationState,
    fit_scale: f32,
}

/// Camera and model transform state of one viewport.
#[derive(Debug, Clone)]
pub struct ViewportState {
    config: ViewportConfig,
    scene: Option<Scene>,
    camera: Camera,
    size: SurfaceSize,
    color: Rgb,
    drag_anchor: Option<Point2<f32>>,
}

impl ViewportState {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(ViewportConfig::default(), width, height)
    }

    pub fn with_config(config: ViewportConfig, width: u32, height: u32) -> Self {
        let mut camera = Camera::new(width, height);
        camera.set_distance(config.initial_distance);
        Self {
            config,
            scene: None,
            camera,
            size: SurfaceSize { width, height },
            color: Rgb::default(),
            drag_anchor: None,
        }
    }

    pub fn phase(&self) -> ViewportPhase {
        if self.scene.is_some() {
            ViewportPhase::Loaded
        } else {
            ViewportPhase::Empty
        }
    }

    /// Show `model`, replacing anything already loaded.
    ///
    /// Rotation and camera distance restart from their initial values.
    pub fn load(&mut self, model: &ParsedModel) {
        let radius = model.vertices().bounding_radius() as f32;
        let fit_scale = if radius > f32::EPSILON {
            self.config.fit_radius / radius
        } else {
            1.0
        };
        debug!(triangles = model.triangle_count(), fit_scale, "viewport loaded model");

        self.scene = Some(Scene {
            mesh: model.vertices().to_mesh(),
            rotation: RotationState::zero(),
            fit_scale,
        });
        self.camera.set_distance(self.config.initial_distance);
        self.drag_anchor = None;
    }

    /// Drop the displayed model, e.g. when a new upload starts.
    pub fn reset(&mut self) {
        self.scene = None;
        self.drag_anchor = None;
        self.camera.set_distance(self.config.initial_distance);
    }

    pub fn handle(&mut self, event: ViewportEvent) {
        match event {
            ViewportEvent::PointerDown { x, y } => self.drag_anchor = Some(Point2::new(x, y)),
            ViewportEvent::PointerMove { x, y } => self.drag_to(Point2::new(x, y)),
            ViewportEvent::PointerUp | ViewportEvent::PointerLeave => self.drag_anchor = None,
            ViewportEvent::Wheel { delta_y } => self.zoom(delta_y),
            ViewportEvent::Resize { width, height } => self.resize(width, height),
            ViewportEvent::Color(code) => {
                self.set_color(&code);
            }
        }
    }

    fn drag_to(&mut self, pointer: Point2<f32>) {
        let (Some(anchor), Some(scene)) = (self.drag_anchor, self.scene.as_mut()) else {
            return;
        };
        let delta = pointer - anchor;
        let k = self.config.drag_sensitivity;
        scene.rotation.rotate(delta.y * k, delta.x * k, 0.0);
        self.drag_anchor = Some(pointer);
    }

    fn zoom(&mut self, delta_y: f32) {
        let distance = (self.camera.distance() + delta_y * self.config.zoom_factor)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.camera.set_distance(distance);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = SurfaceSize { width, height };
        self.camera.set_aspect(width, height);
    }

    /// Apply a `#RRGGBB` color to the surface; returns `false` if unparsable.
    pub fn set_color(&mut self, code: &str) -> bool {
        match Rgb::from_hex(code) {
            Some(color) => {
                self.color = color;
                true
            }
            None => {
                warn!(code, "ignoring invalid color code");
                false
            }
        }
    }

    /// Advance one frame: idle auto-rotation about the vertical axis.
    pub fn advance_frame(&mut self) {
        if self.is_dragging() {
            return;
        }
        if let Some(scene) = self.scene.as_mut() {
            scene.rotation.rotate(0.0, self.config.auto_rotate_step, 0.0);
        }
    }

    /// Advance one frame and draw it on `surface`.
    ///
    /// # Errors
    ///
    /// Propagates the surface's drawing error.
    pub fn render<S: RenderSurface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        self.advance_frame();
        match self.frame() {
            Some(frame) => surface.draw(&frame),
            None => surface.draw_empty(self.size),
        }
    }

    /// The current frame without advancing, `None` while empty.
    pub fn frame(&self) -> Option<Frame<'_>> {
        self.scene.as_ref().map(|scene| Frame {
            mesh: &scene.mesh,
            model_matrix: Transform::model_matrix(&scene.rotation, scene.fit_scale),
            camera: &self.camera,
            color: self.color,
            size: self.size,
        })
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn rotation(&self) -> Option<RotationState> {
        self.scene.as_ref().map(|s| s.rotation)
    }

    pub fn fit_scale(&self) -> Option<f32> {
        self.scene.as_ref().map(|s| s.fit_scale)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }
}
