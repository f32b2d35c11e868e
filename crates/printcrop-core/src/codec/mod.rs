//! Ingestion and export adapters.
//!
//! These sit outside the geometric core: the session only ever sees an
//! [`ImageSource`](crate::raster::ImageSource) coming in and a
//! [`CropExport`](crate::export::CropExport) going out. The adapters here use
//! the `image` crate so hosts without their own codec have one ready.
//!
//! Decoding honours EXIF orientation so phone photos appear upright.

mod decode;
mod encode;

pub use decode::{decode_image, read_orientation, DecodeError, Orientation};
pub use encode::{encode_jpeg, encode_png, EncodeError};
