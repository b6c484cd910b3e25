//! In-memory BVH document and its text codec.

use std::io::{Read, Write};

use log::{debug, warn};

use super::format::{
    FRAME_TIME_LABEL, FRAMES_LABEL, FormatError, LineEnding, MOTION_MARKER, NumberFormat,
    parse_declared_frames, parse_frame_time, split_frame_time, strip_line_ending,
};
use super::io::BvhError;
use super::motion::Motion;

/// A decoded BVH file.
///
/// The header (hierarchy through the `MOTION` line) and the frame time text are
/// kept verbatim so that encoding reproduces them exactly. The declared frame
/// count is never stored; it is recomputed from `motion` on output.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhDocument {
    header: Vec<String>,
    frame_time_text: String,
    frame_time_seconds: f64,
    line_ending: LineEnding,
    /// Motion samples, `frames x channels`.
    pub motion: Motion,
}

impl BvhDocument {
    /// Assemble a document from parts.
    ///
    /// `header` lines carry their own terminators and end with the `MOTION`
    /// marker line, which appears nowhere else. `frame_time_text` is everything
    /// after the `"Frame Time: "` label and must parse as seconds.
    pub fn new(
        header: Vec<String>,
        frame_time_text: impl Into<String>,
        motion: Motion,
    ) -> Result<Self, FormatError> {
        check_header(&header)?;
        let frame_time_text = frame_time_text.into();
        let frame_time_seconds = assembled_frame_time(&frame_time_text, header.len() + 2)?;
        let line_ending = header
            .last()
            .map(|l| LineEnding::detect(l))
            .unwrap_or_default();
        Ok(Self {
            header,
            frame_time_text,
            frame_time_seconds,
            line_ending,
            motion,
        })
    }

    /// Decode a document from its full text.
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        Self::decode(source.split_inclusive('\n'))
    }

    /// Decode a document from a reader holding the full file.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, BvhError> {
        let mut source = String::new();
        r.read_to_string(&mut source)?;
        Ok(Self::parse(&source)?)
    }

    /// Decode a document from raw lines, each including its terminator.
    pub fn decode<'a, I>(lines: I) -> Result<Self, FormatError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lines = lines.into_iter().enumerate().map(|(i, l)| (i + 1, l));

        let mut header = Vec::new();
        let mut marker_line = None;
        for (number, line) in lines.by_ref() {
            header.push(line.to_owned());
            if strip_line_ending(line) == MOTION_MARKER {
                marker_line = Some(number);
                break;
            }
        }
        let marker_line = marker_line.ok_or(FormatError::MissingMarker)?;
        let line_ending = LineEnding::detect(&header[header.len() - 1]);

        let (_, declared) = lines.next().ok_or(FormatError::MissingFrameCount {
            line: marker_line + 1,
        })?;

        let (time_line, frame_time) = lines.next().ok_or(FormatError::MissingFrameTime {
            line: marker_line + 2,
        })?;
        let invalid_time = || FormatError::InvalidFrameTime {
            line: time_line,
            text: frame_time.to_owned(),
        };
        let (label, frame_time_text) = split_frame_time(frame_time).ok_or_else(invalid_time)?;
        if label != FRAME_TIME_LABEL {
            warn!(
                "Unexpected frame time label {:?} at line {}, reading value positionally",
                label, time_line
            );
        }
        let frame_time_seconds = parse_frame_time(frame_time_text).ok_or_else(invalid_time)?;

        let mut data = Vec::new();
        let mut channels: Option<usize> = None;
        let mut frames = 0;
        for (number, line) in lines {
            let mut found = 0;
            for (column, token) in line.split_whitespace().enumerate() {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| FormatError::NonNumericSample {
                        line: number,
                        column,
                        token: token.to_owned(),
                    })?;
                data.push(value);
                found += 1;
            }
            if found == 0 {
                continue;
            }
            match channels {
                None => channels = Some(found),
                Some(expected) if expected != found => {
                    return Err(FormatError::RaggedRow {
                        line: number,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            frames += 1;
        }

        if let Some(count) = parse_declared_frames(declared) {
            if count != frames {
                debug!(
                    "Declared frame count {} differs from {} motion rows, using rows",
                    count, frames
                );
            }
        }

        let motion = Motion::from_flat(frames, channels.unwrap_or(0), data)?;

        Ok(Self {
            header,
            frame_time_text: frame_time_text.to_owned(),
            frame_time_seconds,
            line_ending,
            motion,
        })
    }

    /// Header lines, verbatim, through the `MOTION` marker.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Frame time text after the label, verbatim including its terminator.
    pub fn frame_time_text(&self) -> &str {
        &self.frame_time_text
    }

    /// Frame time in seconds, parsed from `frame_time_text`.
    pub fn frame_time_seconds(&self) -> f64 {
        self.frame_time_seconds
    }

    /// Replace the frame time text; the seconds value is re-parsed from it.
    pub fn set_frame_time_text(&mut self, text: impl Into<String>) -> Result<(), FormatError> {
        let text = text.into();
        let seconds = assembled_frame_time(&text, self.header.len() + 2)?;
        self.frame_time_text = text;
        self.frame_time_seconds = seconds;
        Ok(())
    }

    /// Terminator used for generated lines.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Number of frames (motion rows).
    pub fn frames(&self) -> usize {
        self.motion.frames()
    }

    /// Number of channels (motion columns).
    pub fn channels(&self) -> usize {
        self.motion.channels()
    }

    /// Same header and frame time with different motion data.
    pub fn with_motion(&self, motion: Motion) -> Self {
        Self {
            header: self.header.clone(),
            frame_time_text: self.frame_time_text.clone(),
            frame_time_seconds: self.frame_time_seconds,
            line_ending: self.line_ending,
            motion,
        }
    }

    /// Encode with the shortest round-trip number format.
    pub fn encode(&self) -> String {
        self.encode_with(NumberFormat::Shortest)
    }

    /// Encode to BVH text.
    pub fn encode_with(&self, format: NumberFormat) -> String {
        let eol = self.line_ending.as_str();
        let mut out = String::with_capacity(
            self.header.iter().map(String::len).sum::<usize>()
                + self.motion.as_slice().len() * 12
                + 64,
        );

        for line in &self.header {
            out.push_str(line);
        }

        out.push_str(FRAMES_LABEL);
        out.push_str(&self.motion.frames().to_string());
        out.push_str(eol);

        out.push_str(FRAME_TIME_LABEL);
        out.push_str(&self.frame_time_text);
        if self.motion.frames() > 0 && !self.frame_time_text.ends_with('\n') {
            out.push_str(eol);
        }

        for row in self.motion.rows() {
            for (i, &value) in row.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                format.write_sample(&mut out, value);
            }
            out.push_str(eol);
        }

        out
    }

    /// Write BVH text to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        self.write_to_with(w, NumberFormat::Shortest)
    }

    /// Write BVH text to output using the given number format.
    pub fn write_to_with<W: Write>(&self, w: &mut W, format: NumberFormat) -> std::io::Result<()> {
        w.write_all(self.encode_with(format).as_bytes())
    }
}

/// Header lines must each end in one terminator, with the marker last and only there.
fn check_header(header: &[String]) -> Result<(), FormatError> {
    let Some((last, body)) = header.split_last() else {
        return Err(FormatError::MissingMarker);
    };
    for (i, line) in header.iter().enumerate() {
        if line.find('\n') != Some(line.len().saturating_sub(1)) {
            return Err(FormatError::MalformedHeaderLine { line: i + 1 });
        }
    }
    if let Some(i) = body
        .iter()
        .position(|line| strip_line_ending(line) == MOTION_MARKER)
    {
        return Err(FormatError::EarlyMarker { line: i + 1 });
    }
    if strip_line_ending(last) != MOTION_MARKER {
        return Err(FormatError::MissingMarker);
    }
    Ok(())
}

/// Seconds of frame time text supplied by a caller. A terminator may only end it.
fn assembled_frame_time(text: &str, line: usize) -> Result<f64, FormatError> {
    let terminated_early = text.find('\n').is_some_and(|i| i + 1 != text.len());
    parse_frame_time(text)
        .filter(|_| !terminated_early)
        .ok_or_else(|| FormatError::InvalidFrameTime {
            line,
            text: text.to_owned(),
        })
}

impl std::str::FromStr for BvhDocument {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
