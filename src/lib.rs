//! BVH motion capture codec with angular continuity correction.
//!
//! This crate reads and writes BVH files, keeping the skeleton hierarchy
//! verbatim and the motion section as a strict rectangular matrix, and
//! corrects the 360-degree wraparound of angular channels around an
//! external numeric decomposition.
//!
//! # Architecture
//!
//! - `animation`: BVH document codec and the `Motion` matrix
//! - `compute`: dewrap/rewrap passes, the transform seam and the pipeline
//! - `schema`: Pipeline configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use bvh_continuity::{
//!     animation::{read_bvh, write_bvh, NumberFormat},
//!     compute::{dewrap, rewrap},
//!     schema::ColumnRange,
//! };
//!
//! let mut document = read_bvh("data/jump/13_32.bvh")?;
//! let rotations = ColumnRange::new(3, 6);
//!
//! dewrap(&mut document.motion, rotations)?;
//! // ... transform the continuous signal ...
//! rewrap(&mut document.motion, rotations)?;
//!
//! write_bvh(&document, "decomposition/original", NumberFormat::Shortest)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animation;
pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use animation::{BvhDocument, Motion, NumberFormat};
pub use compute::{Pipeline, dewrap, rewrap};
pub use schema::{ColumnRange, PipelineConfig};
