//! Printcrop Core - print cropping library
//!
//! This crate positions a decoded image inside a physical print frame,
//! filters it, and extracts a pixel-exact crop for export.
//!
//! # Module Structure
//!
//! - `paper` - physical paper size to canvas pixels
//! - `viewport` - pan, zoom and fit of the image on the canvas
//! - `crop` - crop rectangle geometry, units and presets
//! - `filter` - clarity convolution plus brightness/contrast
//! - `easing` - animated clarity and the scheduler capability
//! - `render` - drawing surfaces
//! - `compositor` - preview and export rendering
//! - `session` - immutable session state and its phase machine
//! - `codec` - decode uploads, encode exports
//! - `config` - editor settings

pub mod codec;
pub mod compositor;
pub mod config;
pub mod crop;
pub mod easing;
pub mod error;
pub mod export;
pub mod filter;
pub mod paper;
pub mod raster;
pub mod render;
pub mod session;
pub mod viewport;

pub use codec::{decode_image, encode_jpeg, encode_png, DecodeError, EncodeError};
pub use compositor::OverlayStyle;
pub use config::{EditorConfig, PaperSize};
pub use crop::{mm_to_in, parse_length, parse_size, CropRegion, PixelRect, PRESETS};
pub use easing::{ClarityEasing, ManualScheduler, Scheduler, TaskId};
pub use error::{GeometryError, SessionError};
pub use export::{CropExport, GalleryRecord};
pub use filter::{filter, FilterParameters};
#[cfg(feature = "parallel")]
pub use filter::{FilterResult, FilterWorker};
pub use paper::{PaperCanvas, MAX_RASTER_PIXELS};
pub use raster::{ImageSource, Raster};
pub use render::{PixelBounds, Renderer, SoftwareRenderer};
pub use session::{Phase, PhaseEvent, SessionState};
pub use viewport::{Direction, FitMode, ViewportTransform};
