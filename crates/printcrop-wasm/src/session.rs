//! Editing session bindings.
//!
//! `JsSession` wraps the immutable core state; each call swaps in the new
//! state. Clarity easing runs on the page's animation frames:
//!
//! ```typescript
//! const session = new JsSession({ dpi: 300 });
//! session.load(new Uint8Array(await file.arrayBuffer()));
//!
//! slider.oninput = () => {
//!   session.set_clarity(Number(slider.value));
//!   requestAnimationFrame(frame);
//! };
//!
//! function frame() {
//!   const more = session.tick();
//!   const preview = session.render_preview();
//!   ctx.putImageData(new ImageData(
//!     new Uint8ClampedArray(preview.pixels()), preview.width, preview.height), 0, 0);
//!   if (more) requestAnimationFrame(frame);
//! }
//! ```

use printcrop_core::{
    CropRegion, Direction, EditorConfig, FitMode, ImageSource, Phase, Scheduler, SessionState, TaskId,
};
use wasm_bindgen::prelude::*;

use crate::types::{JsCropExport, JsRaster};

/// Tracks whether the host should keep requesting animation frames.
#[derive(Debug, Default)]
pub(crate) struct FrameScheduler {
    next_id: u64,
    active: Option<TaskId>,
}

impl FrameScheduler {
    pub(crate) fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_repeating(&mut self) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.active = Some(id);
        id
    }

    fn cancel(&mut self, id: TaskId) {
        if self.active == Some(id) {
            self.active = None;
        }
    }
}

fn parse_direction(value: &str) -> Option<Direction> {
    match value.to_ascii_lowercase().as_str() {
        "up" | "arrowup" => Some(Direction::Up),
        "down" | "arrowdown" => Some(Direction::Down),
        "left" | "arrowleft" => Some(Direction::Left),
        "right" | "arrowright" => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn warn(_message: &str) {}

/// One print-cropping session.
#[wasm_bindgen]
pub struct JsSession {
    state: SessionState,
    frames: FrameScheduler,
}

#[wasm_bindgen]
impl JsSession {
    /// Create a session from an optional `EditorConfig`-shaped object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Ok(Self::with_config(&config))
    }

    /// Decode and load image bytes (JPEG or PNG).
    ///
    /// On failure the session keeps its previous image.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.state = self.state.load_bytes(bytes).map_err(|e| {
            let message = format!("Failed to load image: {}", e);
            warn(&message);
            JsValue::from_str(&message)
        })?;
        Ok(())
    }

    /// Load already decoded RGBA pixels, e.g. from `getImageData`.
    pub fn load_rgba(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<(), JsValue> {
        let image = ImageSource::from_rgba(width, height, pixels)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.state = self.state.load_image(image);
        Ok(())
    }

    /// `"empty"` or `"loaded"`. Rendering is synchronous, so the preview and
    /// export phases are never observed between calls.
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        match self.state.phase() {
            Phase::Empty => "empty",
            Phase::Loaded => "loaded",
            Phase::Previewing => "previewing",
            Phase::Exporting => "exporting",
        }
        .to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_width(&self) -> u32 {
        self.state.canvas_size().0
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_height(&self) -> u32 {
        self.state.canvas_size().1
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.state.transform().scale
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> f64 {
        self.state.transform().offset_x
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> f64 {
        self.state.transform().offset_y
    }

    /// Crop rectangle in canvas pixels as `[x, y, width, height]`.
    pub fn crop_rect(&self) -> Vec<f64> {
        let rect = self.state.crop_rect();
        vec![rect.x, rect.y, rect.width as f64, rect.height as f64]
    }

    // Viewport

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.state = self.state.pan(dx, dy);
    }

    /// Wheel zoom: `factor > 1` zooms in around `(x, y)`.
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.state = self.state.zoom_at((x, y), factor);
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.state = self.state.set_scale(scale);
    }

    /// Arrow-key pan. Accepts `"up"` or `"ArrowUp"` style names.
    pub fn nudge(&mut self, direction: &str) {
        match parse_direction(direction) {
            Some(direction) => self.state = self.state.nudge(direction),
            None => warn(&format!("Unknown nudge direction: {}", direction)),
        }
    }

    /// `"fit"` or `"fill"`.
    #[wasm_bindgen(getter)]
    pub fn fit_mode(&self) -> String {
        match self.state.fit_mode() {
            FitMode::Fit => "fit",
            FitMode::Fill => "fill",
        }
        .to_string()
    }

    pub fn toggle_fit_mode(&mut self) {
        self.state = self.state.set_fit_mode(self.state.fit_mode().toggled());
    }

    // Canvas and crop

    pub fn set_paper(&mut self, width_in: f64, height_in: f64) {
        self.state = self.state.set_paper(width_in, height_in);
    }

    pub fn set_dpi(&mut self, dpi: f64) {
        self.state = self.state.set_dpi(dpi);
    }

    /// Call on window resize with the height available for the canvas.
    pub fn set_screen_height(&mut self, px: f64) {
        self.state = self.state.set_screen_height(px);
    }

    /// Set the crop from text such as `"35mm x 45mm"`.
    ///
    /// Returns `false` (keeping the old crop) when the input is rejected.
    pub fn set_crop_size(&mut self, input: &str) -> bool {
        let accepted = CropRegion::parse(input).is_some_and(|crop| self.state.accepts_crop(&crop));
        self.state = self.state.set_crop_size(input);
        accepted
    }

    /// Apply a named preset (`passport`, `wallet`, ...) or a size string.
    pub fn apply_crop_preset(&mut self, name: &str) -> bool {
        let accepted = match CropRegion::from_preset(name) {
            Some(crop) => self.state.accepts_crop(&crop),
            None => {
                warn(&format!("Unknown crop preset: {}", name));
                false
            }
        };
        self.state = self.state.apply_crop_preset(name);
        accepted
    }

    // Filters

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f64 {
        self.state.brightness()
    }

    pub fn set_brightness(&mut self, value: f64) {
        self.state = self.state.set_brightness(value);
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.state.contrast()
    }

    pub fn set_contrast(&mut self, value: f64) {
        self.state = self.state.set_contrast(value);
    }

    /// Clarity currently rendered (follows the target over several frames).
    #[wasm_bindgen(getter)]
    pub fn clarity(&self) -> f64 {
        self.state.clarity().current()
    }

    /// Start easing clarity toward `value`.
    pub fn set_clarity(&mut self, value: f64) {
        self.state = self.state.set_clarity(value, &mut self.frames);
    }

    pub fn reset_filters(&mut self) {
        self.state = self.state.reset_filters(&mut self.frames);
    }

    /// Whether clarity is still animating.
    #[wasm_bindgen(getter)]
    pub fn needs_frame(&self) -> bool {
        self.frames.is_running()
    }

    /// Advance the clarity animation; returns whether another frame is needed.
    pub fn tick(&mut self) -> bool {
        let (state, running) = self.state.tick(&mut self.frames);
        self.state = state;
        running
    }

    // Rendering

    /// The full preview canvas as RGBA.
    pub fn render_preview(&self) -> JsRaster {
        JsRaster::from(self.state.render_preview())
    }

    /// Render the crop at its pixel size.
    pub fn export(&self) -> Result<JsCropExport, JsValue> {
        self.state
            .request_export()
            .map(JsCropExport::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsSession {
    pub(crate) fn with_config(config: &EditorConfig) -> Self {
        Self {
            state: SessionState::new(config),
            frames: FrameScheduler::default(),
        }
    }
}
