use crate::error::{GaitError, Result};
use crate::StepInterval;
use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1};

/// Angle in degrees that the extension convention measures from.
const EXTENSION_REFERENCE_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizationOptions {
    /// Report `180 - angle` instead of the raw joint angle.
    pub convert_to_extension: bool,
    /// Emit the first step too. Off by default: the first step of a
    /// recording is a warm-up step and is left out of the matrix.
    pub include_first_step: bool,
}

/// Right-pad `values` to `width` by repeating its last element.
pub fn pad_edge(values: ArrayView1<f64>, width: usize) -> Array1<f64> {
    let mut padded = Array1::zeros(width);
    let copied = values.len().min(width);
    padded
        .slice_mut(s![..copied])
        .assign(&values.slice(s![..copied]));
    if let Some(last_index) = values.len().checked_sub(1) {
        padded.slice_mut(s![copied..]).fill(values[last_index]);
    }
    padded
}

/// Cut `channel` at each step interval (half-open `[start, end)`) and stack
/// the edge-padded slices into one row per step.
///
/// All rows share the width of the longest step interval. A step running past
/// the end of the channel is cut at the channel end.
pub fn get_padded_knee_angle_vectors(
    channel: ArrayView1<f64>,
    steps: &[StepInterval],
    options: &NormalizationOptions,
) -> Result<Array2<f64>> {
    let skip = if options.include_first_step { 0 } else { 1 };
    if steps.len() <= skip {
        return Err(GaitError::InsufficientIntervals {
            required: skip + 1,
            found: steps.len(),
        });
    }

    let max_width = steps.iter().map(StepInterval::width).max().unwrap_or(0);
    let mut vectors = Array2::zeros((steps.len() - skip, max_width));

    for (row, step) in steps.iter().skip(skip).enumerate() {
        let end = step.end.min(channel.len());
        if step.start >= end {
            return Err(GaitError::IntervalOutOfBounds {
                start: step.start,
                end: step.end,
                len: channel.len(),
            });
        }
        if end < step.end {
            debug!(
                "Step ({}, {}) cut at channel end {}",
                step.start,
                step.end,
                channel.len()
            );
        }

        let slice = channel.slice(s![step.start..end]);
        vectors.row_mut(row).assign(&pad_edge(slice, max_width));
    }

    if options.convert_to_extension {
        vectors.mapv_inplace(|v| EXTENSION_REFERENCE_DEG - v);
    }

    Ok(vectors)
}
