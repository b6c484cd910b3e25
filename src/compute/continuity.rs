//! Angular continuity correction for motion channels.
//!
//! Rotation channels recorded as angles wrap at ±180 degrees. `dewrap` removes
//! the resulting 360-degree jumps so the signal is continuous; `rewrap` folds
//! values back into [-180, 180] before writing. Both passes shift the whole
//! remaining tail of a column when they fire, so corrections accumulate.

use log::debug;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::animation::Motion;
use crate::schema::ColumnRange;

/// Period of an angular channel.
pub const WRAP_PERIOD: f64 = 360.0;

/// Frame-to-frame jump treated as a wrap by `dewrap`.
pub const DEWRAP_THRESHOLD: f64 = 350.0;

/// Bound of the canonical angle range enforced by `rewrap`.
pub const ANGLE_LIMIT: f64 = 180.0;

/// Column range does not fit the matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnRangeError {
    #[error("column range {start}..{end} is reversed")]
    Reversed { start: usize, end: usize },
    #[error("column range {start}..{end} exceeds {channels} channels")]
    OutOfBounds {
        start: usize,
        end: usize,
        channels: usize,
    },
}

/// Outcome of one correction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    /// Columns processed.
    pub columns: usize,
    /// Tail shifts applied across all columns.
    pub shifts: usize,
}

impl std::fmt::Display for CorrectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} shifts across {} columns", self.shifts, self.columns)
    }
}

impl std::ops::AddAssign for CorrectionReport {
    fn add_assign(&mut self, other: Self) {
        self.columns += other.columns;
        self.shifts += other.shifts;
    }
}

/// Remove wrap jumps from one column in place. Returns the number of shifts.
///
/// Each frame is compared with the already corrected frame before it. A drop
/// of more than 350 adds 360 to this and every later frame; a rise of more
/// than 350 subtracts 360 from them.
pub fn dewrap_column(column: &mut [f64]) -> usize {
    let Some(&first) = column.first() else {
        return 0;
    };

    let mut offset = 0.0;
    let mut shifts = 0;
    let mut previous = first;

    for sample in column.iter_mut().skip(1) {
        let delta = previous - (*sample + offset);
        if delta < -DEWRAP_THRESHOLD {
            offset -= WRAP_PERIOD;
            shifts += 1;
        } else if delta > DEWRAP_THRESHOLD {
            offset += WRAP_PERIOD;
            shifts += 1;
        }
        *sample += offset;
        previous = *sample;
    }

    shifts
}

/// Fold one column into [-180, 180] in place. Returns the number of shifts.
///
/// A frame outside the range shifts itself and every later frame by 360 once;
/// the next frame is then checked with that shift applied.
pub fn rewrap_column(column: &mut [f64]) -> usize {
    let mut offset = 0.0;
    let mut shifts = 0;

    for sample in column.iter_mut() {
        let current = *sample + offset;
        if current < -ANGLE_LIMIT {
            offset += WRAP_PERIOD;
            shifts += 1;
        } else if current > ANGLE_LIMIT {
            offset -= WRAP_PERIOD;
            shifts += 1;
        }
        *sample += offset;
    }

    shifts
}

/// Dewrap channels `[start, end)` of `motion` in place.
pub fn dewrap(
    motion: &mut Motion,
    range: ColumnRange,
) -> Result<CorrectionReport, ColumnRangeError> {
    let report = correct_columns(motion, range, dewrap_column)?;
    debug!("Dewrap {}..{}: {}", range.start, range.end, report);
    Ok(report)
}

/// Rewrap channels `[start, end)` of `motion` in place.
pub fn rewrap(
    motion: &mut Motion,
    range: ColumnRange,
) -> Result<CorrectionReport, ColumnRangeError> {
    let report = correct_columns(motion, range, rewrap_column)?;
    debug!("Rewrap {}..{}: {}", range.start, range.end, report);
    Ok(report)
}

fn check_range(range: ColumnRange, channels: usize) -> Result<(), ColumnRangeError> {
    if range.start > range.end {
        return Err(ColumnRangeError::Reversed {
            start: range.start,
            end: range.end,
        });
    }
    if range.end > channels {
        return Err(ColumnRangeError::OutOfBounds {
            start: range.start,
            end: range.end,
            channels,
        });
    }
    Ok(())
}

/// Gather each column of the range, run `kernel` on it, and scatter it back.
///
/// Columns never read each other, so they are processed in parallel on
/// native targets.
fn correct_columns(
    motion: &mut Motion,
    range: ColumnRange,
    kernel: fn(&mut [f64]) -> usize,
) -> Result<CorrectionReport, ColumnRangeError> {
    check_range(range, motion.channels())?;

    let mut columns: Vec<Vec<f64>> = range.iter().map(|c| motion.column(c)).collect();

    #[cfg(not(target_arch = "wasm32"))]
    let shifts: usize = columns.par_iter_mut().map(|c| kernel(c)).sum();

    #[cfg(target_arch = "wasm32")]
    let shifts: usize = columns.iter_mut().map(|c| kernel(c)).sum();

    for (channel, column) in range.iter().zip(&columns) {
        for (sample, &v) in motion.column_iter_mut(channel).zip(column) {
            *sample = v;
        }
    }

    Ok(CorrectionReport {
        columns: range.len(),
        shifts,
    })
}
