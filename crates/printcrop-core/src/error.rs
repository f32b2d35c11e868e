//! Error types shared across the session.
//!
//! Most editing operations never fail outright: invalid input is rejected and
//! the previous state is kept. These types describe *why* an input was
//! rejected so callers (and logs) can report it.

use thiserror::Error;

use crate::session::{Phase, PhaseEvent};

/// Rejected geometry input: paper sizes, crop sizes, raster dimensions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A size was unparsable, non-finite, or not strictly positive.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// An image or canvas has a zero-length side.
    #[error("Degenerate geometry: {width}x{height}")]
    DegenerateGeometry { width: u32, height: u32 },

    /// A pixel buffer does not match its declared dimensions.
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// Errors raised by the session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation needs a loaded image.
    #[error("No image loaded")]
    NotLoaded,

    /// The requested phase change is not part of the state machine.
    #[error("Invalid transition: {event:?} while {from:?}")]
    InvalidTransition { from: Phase, event: PhaseEvent },

    /// The crop rectangle rounds to zero pixels at the current DPI.
    #[error("Crop rounds to an empty raster: {width}x{height} px")]
    DegenerateCrop { width: u32, height: u32 },
}
