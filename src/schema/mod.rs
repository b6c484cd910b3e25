//! Schema module - Configuration types for BVH continuity pipelines.

mod config;

pub use config::*;
