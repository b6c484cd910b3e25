//! Configuration types for BVH continuity pipelines.

use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::animation::NumberFormat;

fn default_true() -> bool {
    true
}

fn default_spacing() -> f64 {
    150.0
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source BVH file.
    pub input: PathBuf,
    /// Directory receiving the exported components.
    pub output_dir: PathBuf,
    /// Angular channels to dewrap before and rewrap after the transform.
    #[serde(default)]
    pub columns: ColumnRange,
    /// Remove 360-degree wrap jumps from the source motion.
    #[serde(default = "default_true")]
    pub dewrap: bool,
    /// Fold exported motion back into [-180, 180].
    #[serde(default = "default_true")]
    pub rewrap: bool,
    /// Channels handed to the transform. Empty selects every channel.
    #[serde(default)]
    pub analysis_channels: Vec<usize>,
    /// Number representation for written motion samples.
    #[serde(default)]
    pub number_format: NumberFormat,
    /// Component export layout.
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/input.bvh"),
            output_dir: PathBuf::from("decomposition"),
            columns: ColumnRange::default(),
            dewrap: true,
            rewrap: true,
            analysis_channels: Vec::new(),
            number_format: NumberFormat::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Half-open range of motion channels, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of channels covered. Zero for reversed ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, channel: usize) -> bool {
        self.start <= channel && channel < self.end
    }

    /// Channel indices in the range.
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Root rotation channels of a standard BVH skeleton (after the root position).
impl Default for ColumnRange {
    fn default() -> Self {
        Self::new(3, 6)
    }
}

impl From<Range<usize>> for ColumnRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// How decomposed components are laid out when exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Add the trend to every exported mode.
    #[serde(default = "default_true")]
    pub include_trend: bool,
    /// Offset between consecutive components on `spacing_channel`.
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Channel receiving the layout offset (root X position by default).
    #[serde(default)]
    pub spacing_channel: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_trend: true,
            spacing: default_spacing(),
            spacing_channel: 0,
        }
    }
}

impl PipelineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if self.columns.start > self.columns.end {
            return Err(ConfigError::ReversedColumns {
                start: self.columns.start,
                end: self.columns.end,
            });
        }
        if !self.export.spacing.is_finite() || self.export.spacing < 0.0 {
            return Err(ConfigError::InvalidSpacing(self.export.spacing));
        }
        if let NumberFormat::General { precision: 0 } = self.number_format {
            return Err(ConfigError::InvalidPrecision);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Input path must be set")]
    MissingInput,
    #[error("Column range {start}..{end} is reversed")]
    ReversedColumns { start: usize, end: usize },
    #[error("Export spacing must be finite and non-negative, got {0}")]
    InvalidSpacing(f64),
    #[error("General number format needs at least one significant digit")]
    InvalidPrecision,
}
