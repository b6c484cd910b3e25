//! BVH motion capture document codec.
//!
//! # File Format
//!
//! A BVH file is line oriented text:
//!
//! ```text
//! HIERARCHY            arbitrary skeleton description, kept verbatim
//! ROOT Hips
//! { ... }
//! MOTION               marker line, nothing else on it
//! Frames: 2            declared count, rewritten on output, never trusted
//! Frame Time: 0.0083333
//! 0.0 90.1 -3.2 ...    one row per frame, whitespace separated floats
//! 0.1 90.4 -3.0 ...
//! ```
//!
//! The frame time label is exactly 12 bytes; the text after it is kept
//! verbatim next to its parsed value. Every motion row must have the same
//! number of values as the first.

mod document;
mod format;
mod io;
mod motion;

pub use document::BvhDocument;
pub use format::{
    DEFAULT_GENERAL_PRECISION, FRAME_TIME_LABEL, FRAMES_LABEL, FormatError, LineEnding,
    MOTION_MARKER, NumberFormat,
};
pub use io::{BVH_EXTENSION, BvhError, read_bvh, write_bvh};
pub use motion::{Motion, ShapeError};
