//! Editing session.
//!
//! [`SessionState`] is an immutable value: every operation returns a new
//! state and leaves the receiver untouched, so a host can keep history,
//! compare states, or drive the session from tests without a UI.
//!
//! # Phases
//!
//! ```text
//! Empty --Load--> Loaded --BeginPreview--> Previewing --Finish--> Loaded
//!                   ^  |                                            |
//!                   |  +--BeginExport--> Exporting --Finish--------+
//!                   +--Load (replacement)
//! ```
//!
//! Rendering is synchronous, so the table acts as a guard: an operation
//! checks that its event has an edge from the current phase and fails with
//! [`SessionError::InvalidTransition`] otherwise. A stored state is always
//! `Empty` or `Loaded`.
//!
//! Invalid input never fails: non-positive sizes, unparsable crop strings,
//! operations without an image, and canvases or crops above
//! [`MAX_RASTER_PIXELS`](crate::paper::MAX_RASTER_PIXELS) keep the previous
//! value and log the rejection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codec::{decode_image, DecodeError};
use crate::compositor::{self, OverlayStyle};
use crate::config::EditorConfig;
use crate::crop::{CropRegion, PixelRect};
use crate::easing::{ClarityEasing, Scheduler};
use crate::error::{GeometryError, SessionError};
use crate::export::CropExport;
use crate::filter::{clamp_param, FilterParameters};
use crate::paper::PaperCanvas;
use crate::raster::{ImageSource, Raster};
use crate::render::{Renderer, SoftwareRenderer};
use crate::viewport::{Direction, FitMode, ViewportTransform};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Empty,
    Loaded,
    Previewing,
    Exporting,
}

/// Inputs to the phase state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// A decode succeeded.
    Load,
    BeginPreview,
    BeginExport,
    /// A preview or export render completed.
    Finish,
}

impl Phase {
    /// Apply an event, or report that the table has no such edge.
    pub fn on(self, event: PhaseEvent) -> Result<Phase, SessionError> {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Empty | Loaded | Previewing, Load) => Ok(Loaded),
            (Loaded, BeginPreview) => Ok(Previewing),
            (Loaded, BeginExport) => Ok(Exporting),
            (Previewing | Exporting, Finish) => Ok(Loaded),
            (from, event) => Err(SessionError::InvalidTransition { from, event }),
        }
    }
}

/// The complete state of one editing session.
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: Phase,
    image: Option<Arc<ImageSource>>,
    transform: ViewportTransform,
    fit_mode: FitMode,
    paper: PaperCanvas,
    crop: CropRegion,
    clarity: ClarityEasing,
    brightness: f64,
    contrast: f64,
    nudge_step: f64,
    overlay: OverlayStyle,
}

impl SessionState {
    /// An empty session built from a configuration.
    ///
    /// Invalid paper or crop settings fall back to their defaults.
    pub fn new(config: &EditorConfig) -> Self {
        let defaults = EditorConfig::default();
        let paper = config
            .paper_canvas()
            .or_else(|err| {
                warn!(%err, "invalid paper configuration, using default paper");
                PaperCanvas::new(
                    defaults.paper.width_in,
                    defaults.paper.height_in,
                    defaults.dpi,
                    config.available_screen_height_px,
                )
            })
            .unwrap_or_else(|err| {
                warn!(%err, "invalid screen height, using default canvas");
                PaperCanvas::default()
            });
        let crop = config
            .crop_region()
            .and_then(|crop| {
                crop.checked_pixels(paper.canvas_size(), paper.px_per_inch())
                    .map(|_| crop)
            })
            .unwrap_or_else(|err| {
                warn!(%err, "invalid crop configuration, using default");
                CropRegion::default()
            });
        let nudge_step = if config.nudge_step_px.is_finite() && config.nudge_step_px > 0.0 {
            config.nudge_step_px
        } else {
            defaults.nudge_step_px
        };

        Self {
            phase: Phase::Empty,
            image: None,
            transform: ViewportTransform::default(),
            fit_mode: config.fit_mode,
            paper,
            crop,
            clarity: ClarityEasing::new(),
            brightness: 0.0,
            contrast: 0.0,
            nudge_step,
            overlay: config.overlay_style(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    pub fn paper(&self) -> PaperCanvas {
        self.paper
    }

    pub fn crop(&self) -> CropRegion {
        self.crop
    }

    pub fn clarity(&self) -> ClarityEasing {
        self.clarity
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    pub fn overlay(&self) -> OverlayStyle {
        self.overlay
    }

    /// Canvas size in pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.paper.canvas_size()
    }

    /// The crop rectangle in canvas pixels.
    pub fn crop_rect(&self) -> PixelRect {
        self.crop
            .to_pixels(self.canvas_size(), self.paper.px_per_inch())
    }

    /// Parameters for the next filter pass, using the animated clarity.
    pub fn filter_parameters(&self) -> FilterParameters {
        FilterParameters::new(self.clarity.current(), self.brightness, self.contrast)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replace the image. Filters and crop carry over; the transform is
    /// re-initialized for the new image.
    pub fn load_image(&self, image: ImageSource) -> Self {
        let phase = match self.phase.on(PhaseEvent::Load) {
            Ok(phase) => phase,
            Err(err) => {
                warn!(%err, "load ignored");
                return self.clone();
            }
        };
        info!(
            width = image.width(),
            height = image.height(),
            replaced = self.is_loaded(),
            "image loaded"
        );
        Self {
            phase,
            image: Some(Arc::new(image)),
            ..self.clone()
        }
        .reinitialize()
    }

    /// Decode bytes and load the result. On failure the session is unchanged.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = decode_image(bytes)?;
        Ok(self.load_image(image))
    }

    /// Fit the current image to the current canvas.
    fn reinitialize(self) -> Self {
        let Some(image) = self.image.as_deref() else {
            return self;
        };
        match ViewportTransform::initialize(
            self.canvas_size(),
            (image.width(), image.height()),
            self.fit_mode,
        ) {
            Some(transform) => {
                debug!(
                    scale = transform.scale,
                    offset_x = transform.offset_x,
                    offset_y = transform.offset_y,
                    "viewport initialized"
                );
                Self { transform, ..self }
            }
            None => {
                debug!(canvas = ?self.canvas_size(), "degenerate canvas, transform kept");
                self
            }
        }
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    fn with_transform(&self, op: impl FnOnce(&ViewportTransform) -> ViewportTransform) -> Self {
        if !self.is_loaded() {
            return self.clone();
        }
        Self {
            transform: op(&self.transform),
            ..self.clone()
        }
    }

    /// Drag by a canvas-pixel delta.
    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        self.with_transform(|t| t.pan_by(dx, dy))
    }

    /// Relative zoom around a canvas point.
    pub fn zoom_at(&self, anchor: (f64, f64), factor: f64) -> Self {
        self.with_transform(|t| t.zoom_at(anchor, factor))
    }

    /// Absolute zoom around the canvas center.
    pub fn set_scale(&self, scale: f64) -> Self {
        let canvas = self.canvas_size();
        self.with_transform(|t| t.set_scale(canvas, scale))
    }

    /// Keyboard pan by the configured step.
    pub fn nudge(&self, direction: Direction) -> Self {
        let step = self.nudge_step;
        self.with_transform(|t| t.nudge(direction, step))
    }

    /// Switch between fit and fill, re-initializing the transform.
    pub fn set_fit_mode(&self, fit_mode: FitMode) -> Self {
        Self {
            fit_mode,
            ..self.clone()
        }
        .reinitialize()
    }

    // ------------------------------------------------------------------
    // Canvas geometry
    // ------------------------------------------------------------------

    fn with_paper(&self, paper: Result<PaperCanvas, GeometryError>) -> Self {
        let paper = paper.and_then(|paper| {
            self.crop
                .checked_pixels(paper.canvas_size(), paper.px_per_inch())
                .map(|_| paper)
        });
        match paper {
            Ok(paper) if paper == self.paper => self.clone(),
            Ok(paper) => {
                debug!(canvas = ?paper.canvas_size(), "canvas resized");
                Self {
                    paper,
                    ..self.clone()
                }
                .reinitialize()
            }
            Err(err) => {
                debug!(%err, "rejected paper change");
                self.clone()
            }
        }
    }

    /// Change the sheet size in inches.
    pub fn set_paper(&self, width_in: f64, height_in: f64) -> Self {
        self.with_paper(self.paper.with_size(width_in, height_in))
    }

    pub fn set_dpi(&self, dpi: f64) -> Self {
        self.with_paper(self.paper.with_dpi(dpi))
    }

    /// The host viewport changed height.
    pub fn set_screen_height(&self, available_height_px: f64) -> Self {
        self.with_paper(self.paper.with_screen_height(available_height_px))
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    /// Whether `crop` fits in a raster on the current canvas.
    pub fn accepts_crop(&self, crop: &CropRegion) -> bool {
        match crop.checked_pixels(self.canvas_size(), self.paper.px_per_inch()) {
            Ok(_) => true,
            Err(err) => {
                debug!(%err, "rejected crop size");
                false
            }
        }
    }

    fn with_crop(&self, crop: Option<CropRegion>) -> Self {
        match crop {
            Some(crop) if self.accepts_crop(&crop) => Self {
                crop,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// Set the crop from user input such as `"35mm x 45mm"`.
    pub fn set_crop_size(&self, input: &str) -> Self {
        self.with_crop(CropRegion::parse(input))
    }

    /// Set the crop from a named preset or a size string.
    pub fn apply_crop_preset(&self, name: &str) -> Self {
        let crop = CropRegion::from_preset(name);
        if let Some(crop) = crop {
            debug!(name, width_in = crop.width_in, height_in = crop.height_in, "crop preset");
        }
        self.with_crop(crop)
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn set_brightness(&self, brightness: f64) -> Self {
        Self {
            brightness: clamp_param(brightness),
            ..self.clone()
        }
    }

    pub fn set_contrast(&self, contrast: f64) -> Self {
        Self {
            contrast: clamp_param(contrast),
            ..self.clone()
        }
    }

    /// Retarget the clarity animation.
    pub fn set_clarity(&self, clarity: f64, scheduler: &mut impl Scheduler) -> Self {
        let mut easing = self.clarity;
        easing.set_target(clarity, scheduler);
        Self {
            clarity: easing,
            ..self.clone()
        }
    }

    /// Set clarity without animating.
    pub fn set_clarity_immediate(&self, clarity: f64, scheduler: &mut impl Scheduler) -> Self {
        let mut easing = self.clarity;
        easing.jump_to(clarity, scheduler);
        Self {
            clarity: easing,
            ..self.clone()
        }
    }

    /// Advance the clarity animation by one frame.
    ///
    /// Returns the new state and whether further frames are needed.
    pub fn tick(&self, scheduler: &mut impl Scheduler) -> (Self, bool) {
        let mut easing = self.clarity;
        let running = easing.on_frame(scheduler);
        (
            Self {
                clarity: easing,
                ..self.clone()
            },
            running,
        )
    }

    /// Zero every filter parameter, cancelling any clarity animation.
    pub fn reset_filters(&self, scheduler: &mut impl Scheduler) -> Self {
        let mut easing = self.clarity;
        easing.jump_to(0.0, scheduler);
        Self {
            clarity: easing,
            brightness: 0.0,
            contrast: 0.0,
            ..self.clone()
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// The canvas with the image drawn but no filters or overlay.
    ///
    /// Hosts that filter in the background pass this to a worker and hand
    /// the result to [`SessionState::finish_preview`].
    pub fn render_canvas(&self) -> Raster {
        compositor::render_canvas(self.image(), &self.transform, self.canvas_size())
    }

    /// Draw the crop overlay onto an already filtered canvas.
    pub fn finish_preview(&self, mut filtered: Raster) -> Raster {
        compositor::draw_crop_overlay(&mut filtered, &self.crop_rect(), &self.overlay);
        filtered
    }

    /// Full preview. An empty session renders blank paper with the crop
    /// overlay.
    pub fn render_preview(&self) -> Raster {
        compositor::render_preview(
            self.image(),
            &self.transform,
            self.canvas_size(),
            &self.crop_rect(),
            &self.filter_parameters(),
            &self.overlay,
        )
    }

    /// [`SessionState::render_preview`] drawn on a host surface.
    pub fn render_preview_with(&self, renderer: &mut impl Renderer) -> Raster {
        compositor::render_preview_with(
            renderer,
            self.image(),
            &self.transform,
            self.canvas_size(),
            &self.crop_rect(),
            &self.filter_parameters(),
            &self.overlay,
        )
    }

    /// Render the crop at its pixel size, filtered and flattened to RGB.
    pub fn request_export(&self) -> Result<CropExport, SessionError> {
        self.request_export_with(&mut SoftwareRenderer::new(0, 0))
    }

    /// [`SessionState::request_export`] drawn on a host surface.
    pub fn request_export_with(
        &self,
        renderer: &mut impl Renderer,
    ) -> Result<CropExport, SessionError> {
        let image = self.image().ok_or(SessionError::NotLoaded)?;
        self.phase.on(PhaseEvent::BeginExport)?;

        let rect = self.crop_rect();
        if rect.width == 0 || rect.height == 0 {
            return Err(SessionError::DegenerateCrop {
                width: rect.width,
                height: rect.height,
            });
        }

        let raster = compositor::render_crop_with(
            renderer,
            image,
            &self.transform,
            &rect,
            &self.filter_parameters(),
        );
        let export = CropExport::from_raster(&raster);

        info!(width = export.width, height = export.height, "crop exported");
        Ok(export)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
