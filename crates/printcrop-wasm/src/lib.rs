//! Printcrop WASM - WebAssembly bindings for printcrop
//!
//! This crate exposes the printcrop-core editing session to
//! JavaScript/TypeScript. It builds without the `parallel` feature, so all
//! pixel work runs on the calling thread.
//!
//! # Module Structure
//!
//! - `session` - the editing session (viewport, crop, filters, rendering)
//! - `types` - WASM-compatible wrappers for rasters and exports
//! - `codec` - PNG/JPEG encoding and gallery records
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession, encode_png } from '@printcrop/wasm';
//!
//! await init();
//!
//! const session = new JsSession();
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! session.apply_crop_preset('passport');
//!
//! const crop = session.export();
//! const png = encode_png(crop);
//! ```

use wasm_bindgen::prelude::*;

mod codec;
mod session;
mod types;

pub use codec::{crop_presets, encode_jpeg, encode_png, gallery_record};
pub use session::JsSession;
pub use types::{JsCropExport, JsRaster};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
