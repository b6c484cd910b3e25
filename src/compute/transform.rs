//! Decomposition seam between corrected motion and exported components.
//!
//! The numeric decomposition itself (for example multivariate EMD) lives
//! outside this crate. It only has to turn one motion matrix into ordered
//! oscillatory modes plus a trend, all sharing the source's channel layout.

use crate::animation::{Motion, ShapeError};

/// Errors reported by a transform or by the components it returns.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("analysis channel {channel} out of bounds for {channels} channels")]
    ChannelOutOfBounds { channel: usize, channels: usize },
    #[error("component shape mismatch: {0}")]
    Shape(#[from] ShapeError),
    #[error("transform failed: {0}")]
    Failed(String),
}

/// A numeric transform producing a component-indexed family of matrices.
pub trait MotionTransform {
    /// Decompose `motion`, sampled every `frame_time` seconds.
    ///
    /// `channels` selects the analysed channels; every returned component still
    /// has all of the source's channels.
    fn decompose(
        &self,
        motion: &Motion,
        frame_time: f64,
        channels: &[usize],
    ) -> Result<ComponentSet, TransformError>;
}

/// Ordered modes plus the trend left after removing them.
#[derive(Debug, Clone)]
pub struct ComponentSet {
    modes: Vec<Motion>,
    trend: Motion,
}

impl ComponentSet {
    /// Build a set, requiring every mode to have the trend's shape.
    pub fn new(modes: Vec<Motion>, trend: Motion) -> Result<Self, TransformError> {
        for mode in &modes {
            if mode.shape() != trend.shape() {
                return Err(ShapeError::Mismatch {
                    expected: trend.shape(),
                    found: mode.shape(),
                }
                .into());
            }
        }
        Ok(Self { modes, trend })
    }

    pub fn modes(&self) -> &[Motion] {
        &self.modes
    }

    pub fn trend(&self) -> &Motion {
        &self.trend
    }

    /// Number of components, modes plus the trend.
    pub fn component_count(&self) -> usize {
        self.modes.len() + 1
    }

    /// `(frames, channels)` shared by all components.
    pub fn shape(&self) -> (usize, usize) {
        self.trend.shape()
    }

    /// Reconstruct the signal by summing every component.
    pub fn sum(&self) -> Motion {
        let (frames, channels) = self.shape();
        let mut total = Motion::zeros(frames, channels);
        for component in self.modes.iter().chain(std::iter::once(&self.trend)) {
            for (t, &c) in total.as_mut_slice().iter_mut().zip(component.as_slice()) {
                *t += c;
            }
        }
        total
    }
}

/// Check that every requested channel exists.
pub fn check_channels(motion: &Motion, channels: &[usize]) -> Result<(), TransformError> {
    match channels.iter().find(|&&c| c >= motion.channels()) {
        Some(&channel) => Err(TransformError::ChannelOutOfBounds {
            channel,
            channels: motion.channels(),
        }),
        None => Ok(()),
    }
}

/// Pass-through transform: no modes, the input is the trend.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl MotionTransform for IdentityTransform {
    fn decompose(
        &self,
        motion: &Motion,
        _frame_time: f64,
        channels: &[usize],
    ) -> Result<ComponentSet, TransformError> {
        check_channels(motion, channels)?;
        ComponentSet::new(Vec::new(), motion.clone())
    }
}
