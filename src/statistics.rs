use crate::error::{GaitError, Result};
use ndarray::{Array1, Array2, Axis};

/// z value of a two-sided 95 % interval.
const Z_95: f64 = 1.96;

/// Per-sample statistics across all normalised steps.
#[derive(Debug, Clone, PartialEq)]
pub struct StepStatistics {
    /// Seconds since step onset, one entry per column.
    pub time: Array1<f64>,
    pub mean: Array1<f64>,
    /// Population standard deviation.
    pub std: Array1<f64>,
    /// Half-width of the 95 % confidence band around `mean`.
    pub confidence: Array1<f64>,
    pub step_count: usize,
}

impl StepStatistics {
    pub fn lower(&self) -> Array1<f64> {
        &self.mean - &self.confidence
    }

    pub fn upper(&self) -> Array1<f64> {
        &self.mean + &self.confidence
    }
}

/// Evenly spaced time axis from 0 to `samples / sampling_rate_hz`, both ends
/// included.
pub fn time_axis(samples: usize, sampling_rate_hz: f64) -> Array1<f64> {
    Array1::linspace(0.0, samples as f64 / sampling_rate_hz, samples)
}

pub fn compute_step_statistics(steps: &Array2<f64>, sampling_rate_hz: f64) -> Result<StepStatistics> {
    if !(sampling_rate_hz > 0.0) {
        return Err(GaitError::InvalidConfig(format!(
            "sampling rate must be positive, got {}",
            sampling_rate_hz
        )));
    }

    let step_count = steps.nrows();
    let mean = steps
        .mean_axis(Axis(0))
        .ok_or(GaitError::InsufficientIntervals {
            required: 1,
            found: step_count,
        })?;
    let std = steps.std_axis(Axis(0), 0.0);
    let confidence = std.mapv(|s| Z_95 * s / (step_count as f64).sqrt());

    Ok(StepStatistics {
        time: time_axis(steps.ncols(), sampling_rate_hz),
        mean,
        std,
        confidence,
        step_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn mean_std_and_band_per_column() {
        let steps = array![[1.0, 10.0, 4.0], [3.0, 10.0, 8.0], [2.0, 10.0, 6.0], [2.0, 10.0, 6.0]];
        let stats = compute_step_statistics(&steps, 1000.0).unwrap();

        assert_eq!(stats.step_count, 4);
        assert_eq!(stats.mean, array![2.0, 10.0, 6.0]);
        assert_abs_diff_eq!(stats.std[0], 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std[1], 0.0);
        assert_abs_diff_eq!(stats.std[2], 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(stats.confidence[2], 1.96 * 2.0_f64.sqrt() / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.upper()[2] - stats.lower()[2], 2.0 * stats.confidence[2]);
    }

    #[test]
    fn time_axis_spans_width_over_rate() {
        let axis = time_axis(5, 1000.0);
        assert_eq!(axis.len(), 5);
        assert_abs_diff_eq!(axis[0], 0.0);
        assert_abs_diff_eq!(axis[4], 0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(axis[1], 0.00125, epsilon = 1e-15);
    }

    #[test]
    fn no_steps_is_insufficient() {
        let steps = Array2::<f64>::zeros((0, 4));
        assert!(matches!(
            compute_step_statistics(&steps, 1000.0),
            Err(GaitError::InsufficientIntervals { .. })
        ));
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let steps = array![[1.0, 2.0]];
        assert!(matches!(
            compute_step_statistics(&steps, 0.0),
            Err(GaitError::InvalidConfig(_))
        ));
    }
}
