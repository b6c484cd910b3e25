//! Pipeline driver - from a source BVH file to exported components.
//!
//! Stages: read, dewrap the angular channels, decompose, then lay out every
//! component, rewrap it and write it next to the others.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::info;

use super::continuity::{ColumnRangeError, CorrectionReport, dewrap, rewrap};
use super::transform::{ComponentSet, IdentityTransform, MotionTransform, TransformError};
use crate::animation::{BvhDocument, BvhError, Motion, ShapeError, read_bvh, write_bvh};
use crate::schema::{ConfigError, PipelineConfig};

/// Errors from any pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bvh(#[from] BvhError),
    #[error("Continuity correction failed: {0}")]
    ColumnRange(#[from] ColumnRangeError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("Component layout failed: {0}")]
    Shape(#[from] ShapeError),
    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One motion matrix ready to be written under `name`.
#[derive(Debug, Clone)]
pub struct ExportedComponent {
    /// File stem, without extension.
    pub name: String,
    pub motion: Motion,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub frames: usize,
    pub channels: usize,
    pub frame_time: f64,
    pub dewrap: CorrectionReport,
    pub rewrap: CorrectionReport,
    pub written: Vec<PathBuf>,
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames x {} channels ({}s/frame), dewrap: {}, rewrap: {}, {} files written",
            self.frames,
            self.channels,
            self.frame_time,
            self.dewrap,
            self.rewrap,
            self.written.len()
        )
    }
}

/// Source-to-components pipeline around a pluggable transform.
pub struct Pipeline<T: MotionTransform = IdentityTransform> {
    config: PipelineConfig,
    transform: T,
}

impl Pipeline<IdentityTransform> {
    /// Create a pipeline that exports the corrected source as its own trend.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_transform(config, IdentityTransform)
    }
}

impl<T: MotionTransform> Pipeline<T> {
    /// Create a pipeline using `transform` for decomposition.
    pub fn with_transform(config: PipelineConfig, transform: T) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, transform })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and write the components to `output_dir`.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let mut document = read_bvh(&self.config.input)?;
        let dewrap_report = self.correct_source(&mut document)?;

        let channels: Vec<usize> = if self.config.analysis_channels.is_empty() {
            (0..document.channels()).collect()
        } else {
            self.config.analysis_channels.clone()
        };
        let components = self.transform.decompose(
            &document.motion,
            document.frame_time_seconds(),
            &channels,
        )?;
        if components.shape().1 != document.channels() {
            return Err(ShapeError::Mismatch {
                expected: document.motion.shape(),
                found: components.shape(),
            }
            .into());
        }
        info!("Decomposed into {} modes plus trend", components.modes().len());

        let (exports, rewrap_report) = self.layout(&components)?;

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| PipelineError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(exports.len());
        for export in exports {
            let output = document.with_motion(export.motion);
            written.push(write_bvh(
                &output,
                output_dir.join(&export.name),
                self.config.number_format,
            )?);
        }

        Ok(PipelineReport {
            frames: document.frames(),
            channels: document.channels(),
            frame_time: document.frame_time_seconds(),
            dewrap: dewrap_report,
            rewrap: rewrap_report,
            written,
        })
    }

    /// Dewrap the configured columns of a decoded source in place.
    pub fn correct_source(
        &self,
        document: &mut BvhDocument,
    ) -> Result<CorrectionReport, PipelineError> {
        if !self.config.dewrap {
            return Ok(CorrectionReport::default());
        }
        let report = dewrap(&mut document.motion, self.config.columns)?;
        info!("Dewrapped source: {}", report);
        Ok(report)
    }

    /// Arrange components for export.
    ///
    /// Mode `i` (1-based) becomes `IMF{i}`, with the trend added when
    /// `include_trend` is set; the trend becomes `Trend` and the sum of all
    /// components `original`. Modes and trend are offset on `spacing_channel`
    /// by their position times `spacing`; `original` keeps its place. Each
    /// result is then rewrapped on its own copy, so `original` sums the trend
    /// as decomposed, never the rewrapped `Trend` export.
    pub fn layout(
        &self,
        components: &ComponentSet,
    ) -> Result<(Vec<ExportedComponent>, CorrectionReport), PipelineError> {
        let export = &self.config.export;
        let mut exports = Vec::with_capacity(components.component_count() + 1);

        for (i, mode) in components.modes().iter().enumerate() {
            let mut motion = mode.clone();
            if export.include_trend {
                motion.add_assign(components.trend())?;
            }
            exports.push((format!("IMF{}", i + 1), motion, i + 1));
        }
        exports.push((
            "Trend".to_string(),
            components.trend().clone(),
            components.component_count(),
        ));
        exports.push(("original".to_string(), components.sum(), 0));

        let mut rewrap_report = CorrectionReport::default();
        let mut laid_out = Vec::with_capacity(exports.len());
        for (name, mut motion, position) in exports {
            if position > 0 && export.spacing != 0.0 {
                motion.offset_channel(export.spacing_channel, position as f64 * export.spacing)?;
            }
            if self.config.rewrap {
                rewrap_report += rewrap(&mut motion, self.config.columns)?;
            }
            laid_out.push(ExportedComponent { name, motion });
        }

        Ok((laid_out, rewrap_report))
    }
}
