//! End-to-end pipeline runs against files on disk.

use std::fs;
use std::path::Path;

use bvh_continuity::{
    animation::{BvhDocument, Motion, NumberFormat, read_bvh},
    compute::{ComponentSet, MotionTransform, Pipeline, PipelineError, TransformError},
    schema::PipelineConfig,
};
use tempfile::tempdir;

const SOURCE: &str = "\
HIERARCHY
ROOT Hips
{
\tOFFSET 0.00 0.00 0.00
\tCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
}
MOTION
Frames: 4
Frame Time: 0.0083333
0 90 0 170 10 -5
1 90 0 178 -5 -3
2 90 0 -176 -12 0
3 90 0 -170 -20 2
";

/// Splits every channel into its mean (trend) and the remainder (one mode).
struct MeanSplit;

impl MotionTransform for MeanSplit {
    fn decompose(
        &self,
        motion: &Motion,
        _frame_time: f64,
        _channels: &[usize],
    ) -> Result<ComponentSet, TransformError> {
        let (frames, channels) = motion.shape();
        let mut trend = Motion::zeros(frames, channels);
        let mut mode = motion.clone();
        for c in 0..channels {
            let column = motion.column(c);
            let mean = column.iter().sum::<f64>() / frames as f64;
            trend.set_column(c, &vec![mean; frames])?;
            mode.offset_channel(c, -mean)?;
        }
        ComponentSet::new(vec![mode], trend)
    }
}

/// Returns components with one channel missing.
struct Truncating;

impl MotionTransform for Truncating {
    fn decompose(
        &self,
        motion: &Motion,
        _frame_time: f64,
        _channels: &[usize],
    ) -> Result<ComponentSet, TransformError> {
        ComponentSet::new(vec![], Motion::zeros(motion.frames(), motion.channels() - 1))
    }
}

fn setup(dir: &Path) -> PipelineConfig {
    let input = dir.join("13_32.bvh");
    fs::write(&input, SOURCE).unwrap();
    PipelineConfig {
        input,
        output_dir: dir.join("decomposition"),
        ..Default::default()
    }
}

#[test]
fn test_identity_pipeline_restores_source() {
    let dir = tempdir().unwrap();
    let config = setup(dir.path());
    let output_dir = config.output_dir.clone();

    let report = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(report.frames, 4);
    assert_eq!(report.channels, 6);
    assert_eq!(report.dewrap.shifts, 1);
    assert_eq!(report.rewrap.shifts, 2);
    assert_eq!(
        report.written,
        vec![output_dir.join("Trend.bvh"), output_dir.join("original.bvh")]
    );

    // Dewrap followed by rewrap restores every in-range angle exactly.
    let original = fs::read_to_string(output_dir.join("original.bvh")).unwrap();
    assert_eq!(original, SOURCE);

    let trend = read_bvh(output_dir.join("Trend.bvh")).unwrap();
    let source = BvhDocument::parse(SOURCE).unwrap();
    assert_eq!(trend.header(), source.header());
    assert_eq!(trend.frame_time_text(), "0.0083333\n");
    assert_eq!(trend.motion.column(0), vec![150.0, 151.0, 152.0, 153.0]);
    for c in 1..6 {
        assert_eq!(trend.motion.column(c), source.motion.column(c));
    }
}

#[test]
fn test_custom_transform_exports_modes() {
    let dir = tempdir().unwrap();
    let config = setup(dir.path());
    let output_dir = config.output_dir.clone();

    let report = Pipeline::with_transform(config, MeanSplit)
        .unwrap()
        .run()
        .unwrap();
    let names: Vec<_> = report
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["IMF1.bvh", "Trend.bvh", "original.bvh"]);

    let source = BvhDocument::parse(SOURCE).unwrap();

    // Mode plus trend is the source, shifted one slot along X.
    let imf = read_bvh(output_dir.join("IMF1.bvh")).unwrap();
    assert_eq!(imf.motion.column(0), vec![150.0, 151.0, 152.0, 153.0]);
    for c in 1..6 {
        assert_eq!(imf.motion.column(c), source.motion.column(c));
    }

    // Trend of the dewrapped Zrotation is 180.5, folded to -179.5.
    let trend = read_bvh(output_dir.join("Trend.bvh")).unwrap();
    assert_eq!(trend.motion.column(0), vec![301.5; 4]);
    assert_eq!(trend.motion.column(3), vec![-179.5; 4]);

    let original = fs::read_to_string(output_dir.join("original.bvh")).unwrap();
    assert_eq!(original, SOURCE);
}

#[test]
fn test_general_number_format_output() {
    let dir = tempdir().unwrap();
    let mut config = setup(dir.path());
    config.number_format = NumberFormat::general();
    config.dewrap = false;
    config.rewrap = false;
    let output_dir = config.output_dir.clone();

    Pipeline::with_transform(config, MeanSplit)
        .unwrap()
        .run()
        .unwrap();

    let trend = fs::read_to_string(output_dir.join("Trend.bvh")).unwrap();
    let first_row = trend.lines().nth(9).unwrap();
    // Means without dewrap: Zrotation (170+178-176-170)/4 = 0.5.
    assert_eq!(first_row, "301.5 90 0 0.5 -6.75 -1.5");
}

#[test]
fn test_transform_shape_mismatch_rejected() {
    let dir = tempdir().unwrap();
    let config = setup(dir.path());
    let err = Pipeline::with_transform(config, Truncating)
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Shape(_)));
}

#[test]
fn test_columns_beyond_channels_rejected() {
    let dir = tempdir().unwrap();
    let mut config = setup(dir.path());
    config.columns = (3..7).into();
    let err = Pipeline::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::ColumnRange(_)));
}

#[test]
fn test_malformed_source_reported() {
    let dir = tempdir().unwrap();
    let config = setup(dir.path());
    fs::write(&config.input, SOURCE.replace("-5 -3", "-5")).unwrap();
    let err = Pipeline::new(config).unwrap().run().unwrap_err();
    assert!(err.to_string().contains("ragged motion row at line 11"));
}
