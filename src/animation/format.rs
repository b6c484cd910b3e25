//! Text format definitions for BVH motion files.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::motion::ShapeError;

/// Line separating the skeleton hierarchy from the motion section.
pub const MOTION_MARKER: &str = "MOTION";

/// Label of the declared frame count line.
pub const FRAMES_LABEL: &str = "Frames: ";

/// Label of the frame time line. Always split positionally at its byte length.
pub const FRAME_TIME_LABEL: &str = "Frame Time: ";

/// Significant digits used by C's `%g` when no precision is given.
pub const DEFAULT_GENERAL_PRECISION: usize = 6;

/// Magnitudes written positionally by `NumberFormat::Shortest`; others use an exponent.
const SHORTEST_FIXED_RANGE: std::ops::Range<f64> = 1e-5..1e16;

/// Line terminator style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Detect the terminator of a single raw line. Lines without one are LF.
    pub fn detect(line: &str) -> Self {
        if line.ends_with("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

/// Remove a trailing `\n` or `\r\n` from a raw line.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Numeric representation used for motion samples on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberFormat {
    /// Shortest text that parses back to the identical `f64`.
    #[default]
    Shortest,
    /// C `%g` with the given number of significant digits.
    General { precision: usize },
}

impl NumberFormat {
    /// `%g` with six significant digits.
    pub const fn general() -> Self {
        NumberFormat::General {
            precision: DEFAULT_GENERAL_PRECISION,
        }
    }

    /// Append one formatted sample to `out`.
    pub fn write_sample(self, out: &mut String, value: f64) {
        match self {
            NumberFormat::Shortest => {
                let magnitude = value.abs();
                if magnitude == 0.0 || SHORTEST_FIXED_RANGE.contains(&magnitude) {
                    let _ = write!(out, "{value}");
                } else {
                    let _ = write!(out, "{value:e}");
                }
            }
            NumberFormat::General { precision } => write_general(out, value, precision),
        }
    }
}

/// `%g` formatting: `precision` significant digits, scientific notation when the
/// decimal exponent is below -4 or at least `precision`, trailing zeros removed.
fn write_general(out: &mut String, value: f64, precision: usize) {
    if value.is_nan() {
        out.push_str("nan");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "inf" } else { "-inf" });
        return;
    }
    if value == 0.0 {
        out.push_str(if value.is_sign_negative() { "-0" } else { "0" });
        return;
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        out.push_str(&scientific);
        return;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        out.push_str(trim_fraction(mantissa));
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        let _ = write!(out, "{:02}", exponent.unsigned_abs());
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        out.push_str(trim_fraction(&fixed));
    }
}

/// Drop trailing zeros of a fractional part, and the point if nothing remains.
fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Errors raised while decoding a BVH document.
///
/// Line numbers are 1-based, columns 0-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("marker not found: no line reads exactly \"MOTION\"")]
    MissingMarker,
    #[error("header line {line} must end with exactly one line terminator")]
    MalformedHeaderLine { line: usize },
    #[error("marker at header line {line} must be the last header line")]
    EarlyMarker { line: usize },
    #[error("missing frame count line at line {line}")]
    MissingFrameCount { line: usize },
    #[error("missing frame time line at line {line}")]
    MissingFrameTime { line: usize },
    #[error("invalid frame time at line {line}: {text:?}")]
    InvalidFrameTime { line: usize, text: String },
    #[error("non-numeric motion sample at line {line}, column {column}: {token:?}")]
    NonNumericSample {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("ragged motion row at line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid motion shape: {0}")]
    Shape(#[from] ShapeError),
}

/// Split a frame time line into its fixed-width label and the verbatim remainder.
pub fn split_frame_time(line: &str) -> Option<(&str, &str)> {
    let width = FRAME_TIME_LABEL.len();
    if line.len() < width || !line.is_char_boundary(width) {
        return None;
    }
    Some(line.split_at(width))
}

/// Parse the numeric seconds out of a frame time remainder.
pub fn parse_frame_time(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

/// Declared count of a `Frames:` line, if it has one. Informational only.
pub fn parse_declared_frames(line: &str) -> Option<usize> {
    strip_line_ending(line)
        .trim()
        .strip_prefix(FRAMES_LABEL.trim_end())?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(value: f64) -> String {
        let mut out = String::new();
        NumberFormat::general().write_sample(&mut out, value);
        out
    }

    fn shortest(value: f64) -> String {
        let mut out = String::new();
        NumberFormat::Shortest.write_sample(&mut out, value);
        out
    }

    #[test]
    fn test_general_matches_printf() {
        assert_eq!(general(0.0083333), "0.0083333");
        assert_eq!(general(100.0), "100");
        assert_eq!(general(-12.5), "-12.5");
        assert_eq!(general(1234567.0), "1.23457e+06");
        assert_eq!(general(0.00001), "1e-05");
        assert_eq!(general(0.0001), "0.0001");
        assert_eq!(general(123456.0), "123456");
        assert_eq!(general(1.0 / 3.0), "0.333333");
        assert_eq!(general(-0.0), "-0");
        assert_eq!(general(0.0), "0");
    }

    #[test]
    fn test_general_rounding_carries_exponent() {
        // Rounds up to 100000, which still fits in six digits.
        assert_eq!(general(99999.97), "100000");
        assert_eq!(general(999999.7), "1e+06");
    }

    #[test]
    fn test_general_non_finite() {
        assert_eq!(general(f64::NAN), "nan");
        assert_eq!(general(f64::INFINITY), "inf");
        assert_eq!(general(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_shortest_roundtrips() {
        for value in [0.1, -179.99999999, 1e-300, 12345.678901234, 360.0] {
            let text = shortest(value);
            assert_eq!(text.parse::<f64>().unwrap(), value);
        }
        assert_eq!(shortest(10.0), "10");
    }

    #[test]
    fn test_shortest_uses_exponent_at_extremes() {
        assert_eq!(shortest(1e300), "1e300");
        assert_eq!(shortest(-2.5e-7), "-2.5e-7");
        assert_eq!(shortest(1e16), "1e16");
        assert_eq!(shortest(9999999999999998.0), "9999999999999998");
        assert_eq!(shortest(0.00001), "0.00001");
        assert_eq!(shortest(-0.0), "-0");
        assert_eq!(shortest(f64::INFINITY), "inf");
        for value in [1e300, -2.5e-7, 5e-324, f64::MAX] {
            assert_eq!(shortest(value).parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(strip_line_ending("MOTION\n"), "MOTION");
        assert_eq!(strip_line_ending("MOTION\r\n"), "MOTION");
        assert_eq!(strip_line_ending("MOTION"), "MOTION");
        assert_eq!(LineEnding::detect("MOTION\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("MOTION\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("MOTION"), LineEnding::Lf);
    }

    #[test]
    fn test_split_frame_time() {
        let (label, rest) = split_frame_time("Frame Time: 0.0083333\n").unwrap();
        assert_eq!(label, FRAME_TIME_LABEL);
        assert_eq!(rest, "0.0083333\n");
        assert!((parse_frame_time(rest).unwrap() - 0.0083333).abs() < 1e-12);

        assert!(split_frame_time("Frame Time:").is_none());
        assert!(parse_frame_time("fast\n").is_none());
    }

    #[test]
    fn test_declared_frames() {
        assert_eq!(parse_declared_frames("Frames: 42\n"), Some(42));
        assert_eq!(parse_declared_frames("Frames:\t7\r\n"), Some(7));
        assert_eq!(parse_declared_frames("Frame count 3\n"), None);
    }

    #[test]
    fn test_number_format_serde() {
        let json = serde_json::to_string(&NumberFormat::general()).unwrap();
        assert_eq!(json, r#"{"kind":"general","precision":6}"#);
        let parsed: NumberFormat = serde_json::from_str(r#"{"kind":"shortest"}"#).unwrap();
        assert_eq!(parsed, NumberFormat::Shortest);
    }
}
