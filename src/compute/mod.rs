//! Compute module - Continuity correction and the decomposition pipeline.

mod continuity;
mod pipeline;
mod transform;

pub use continuity::*;
pub use pipeline::*;
pub use transform::*;
