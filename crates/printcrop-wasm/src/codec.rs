//! Encoding and gallery bindings for finished crops.
//!
//! ```typescript
//! const crop = session.export();
//! const png = encode_png(crop);
//! const blob = new Blob([png], { type: 'image/png' });
//! saveAs(blob, crop.suggested_filename('png'));
//!
//! gallery.add(gallery_record(crop));
//! ```

use printcrop_core::{codec, GalleryRecord, PRESETS};
use wasm_bindgen::prelude::*;

use crate::types::JsCropExport;

/// Encode a crop as lossless PNG.
#[wasm_bindgen]
pub fn encode_png(export: &JsCropExport) -> Result<Vec<u8>, JsValue> {
    codec::encode_png(export.inner()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a crop as JPEG (quality 1-100).
#[wasm_bindgen]
pub fn encode_jpeg(export: &JsCropExport, quality: u8) -> Result<Vec<u8>, JsValue> {
    codec::encode_jpeg(export.inner(), quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Build the `{id, pixel_data, width, height, timestamp}` record for the
/// gallery, stamped with the current time.
#[wasm_bindgen]
pub fn gallery_record(export: &JsCropExport) -> Result<JsValue, JsValue> {
    let timestamp = js_sys::Date::now() as u64;
    let record = GalleryRecord::from_export(export.inner().clone(), timestamp);
    serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Named crop presets as `[[name, size], ...]`.
#[wasm_bindgen]
pub fn crop_presets() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(PRESETS).map_err(|e| JsValue::from_str(&e.to_string()))
}
