//! Rectangular motion sample matrix.

/// Motion samples as a `frames x channels` matrix.
///
/// Data is stored row-major: `data[frame * channels + channel]`.
/// Every row holds exactly `channels` values; constructors reject anything else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Motion {
    data: Vec<f64>,
    frames: usize,
    channels: usize,
}

/// Errors raised when a matrix would not be rectangular or shapes disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{found} samples cannot fill a {frames}x{channels} matrix")]
    DataLength {
        frames: usize,
        channels: usize,
        found: usize,
    },
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    Mismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("channel {channel} out of bounds for {channels} channels")]
    ChannelOutOfBounds { channel: usize, channels: usize },
}

impl Motion {
    /// Create a zero-filled matrix.
    ///
    /// A matrix without samples is always `0 x 0`, as it reads back from text.
    pub fn zeros(frames: usize, channels: usize) -> Self {
        if frames == 0 || channels == 0 {
            return Self::default();
        }
        Self {
            data: vec![0.0; frames * channels],
            frames,
            channels,
        }
    }

    /// Build from row-major samples.
    pub fn from_flat(frames: usize, channels: usize, data: Vec<f64>) -> Result<Self, ShapeError> {
        if data.len() != frames * channels || (channels == 0 && frames > 0) {
            return Err(ShapeError::DataLength {
                frames,
                channels,
                found: data.len(),
            });
        }
        if frames == 0 {
            return Ok(Self::default());
        }
        Ok(Self {
            data,
            frames,
            channels,
        })
    }

    /// Build from rows, requiring every row to match the first row's length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let channels = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * channels);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != channels {
                return Err(ShapeError::RaggedRow {
                    row,
                    expected: channels,
                    found: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::from_flat(rows.len(), channels, data)
    }

    /// Number of time samples (rows).
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of channels (columns).
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(frames, channels)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.frames, self.channels)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major sample storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major sample storage. The shape cannot change through it.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Sample at (frame, channel).
    #[inline]
    pub fn get(&self, frame: usize, channel: usize) -> Option<f64> {
        if frame < self.frames && channel < self.channels {
            Some(self.data[frame * self.channels + channel])
        } else {
            None
        }
    }

    /// Samples of one frame.
    pub fn row(&self, frame: usize) -> Option<&[f64]> {
        if frame < self.frames {
            Some(&self.data[frame * self.channels..(frame + 1) * self.channels])
        } else {
            None
        }
    }

    /// Iterate over frames in time order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.frames).map(move |f| &self.data[f * self.channels..(f + 1) * self.channels])
    }

    /// Samples of one channel in time order. Empty if the channel does not exist.
    pub fn column_iter(&self, channel: usize) -> impl Iterator<Item = &f64> + '_ {
        let len = if channel < self.channels { self.frames } else { 0 };
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels.max(1))
            .take(len)
    }

    /// Mutable samples of one channel in time order. Empty if the channel does not exist.
    pub fn column_iter_mut(&mut self, channel: usize) -> impl Iterator<Item = &mut f64> + '_ {
        let len = if channel < self.channels { self.frames } else { 0 };
        let stride = self.channels.max(1);
        self.data.iter_mut().skip(channel).step_by(stride).take(len)
    }

    /// Copy one channel out as a contiguous vector.
    pub fn column(&self, channel: usize) -> Vec<f64> {
        self.column_iter(channel).copied().collect()
    }

    /// Overwrite one channel from a contiguous slice of `frames` values.
    pub fn set_column(&mut self, channel: usize, values: &[f64]) -> Result<(), ShapeError> {
        if channel >= self.channels {
            return Err(ShapeError::ChannelOutOfBounds {
                channel,
                channels: self.channels,
            });
        }
        if values.len() != self.frames {
            return Err(ShapeError::Mismatch {
                expected: (self.frames, 1),
                found: (values.len(), 1),
            });
        }
        for (sample, &v) in self.column_iter_mut(channel).zip(values) {
            *sample = v;
        }
        Ok(())
    }

    /// Add a constant to every sample of one channel.
    pub fn offset_channel(&mut self, channel: usize, delta: f64) -> Result<(), ShapeError> {
        if channel >= self.channels {
            return Err(ShapeError::ChannelOutOfBounds {
                channel,
                channels: self.channels,
            });
        }
        for sample in self.column_iter_mut(channel) {
            *sample += delta;
        }
        Ok(())
    }

    /// Element-wise accumulate another matrix of identical shape.
    pub fn add_assign(&mut self, other: &Motion) -> Result<(), ShapeError> {
        if self.shape() != other.shape() {
            return Err(ShapeError::Mismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }
}
