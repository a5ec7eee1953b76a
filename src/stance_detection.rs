use crate::StanceInterval;
use log::{debug, info, trace};
use ndarray::ArrayView1;

/// Thresholds for accepting a stance phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StanceCriteria {
    /// Shortest stance, in samples, that is not treated as detector noise.
    pub min_stance_samples: usize,
    /// Intervals whose duration lies this many standard deviations (or more)
    /// from the mean are rejected.
    pub outlier_std_factor: f64,
}

impl Default for StanceCriteria {
    fn default() -> Self {
        Self {
            min_stance_samples: 100,
            outlier_std_factor: 2.0,
        }
    }
}

/// Summary of the outlier pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StanceFilterReport {
    pub raw_count: usize,
    pub removed: usize,
    pub mean_duration: f64,
    pub std_duration: f64,
}

/// Scan the flight flag for stance phases (flag == 0).
///
/// A stance still open when the signal ends is dropped; so is any stance
/// shorter than `min_stance_samples`.
pub fn detect_stance_intervals(
    flight_flag: ArrayView1<f64>,
    min_stance_samples: usize,
) -> Vec<StanceInterval> {
    let mut intervals = Vec::new();
    let mut in_flight = true;
    let mut stance_start = 0;

    for (i, &flag) in flight_flag.iter().enumerate() {
        if flag == 0.0 {
            if in_flight {
                in_flight = false;
                stance_start = i;
            }
        } else if !in_flight {
            in_flight = true;
            let stance_end = i - 1;
            let interval = StanceInterval::new(stance_start, stance_end);
            if interval.sample_count() >= min_stance_samples {
                intervals.push(interval);
            } else {
                trace!(
                    "Ignoring {}-sample stance at {}",
                    interval.sample_count(),
                    stance_start
                );
            }
        }
    }

    if !in_flight {
        debug!("Discarding trailing stance opened at {}", stance_start);
    }

    intervals
}

/// Single z-score pass over interval durations, keeping order.
///
/// With no spread in durations (one interval, or all equal) nothing can be
/// told apart from the mean and every interval is kept.
pub fn filter_outlier_intervals(
    intervals: &[StanceInterval],
    std_factor: f64,
) -> (Vec<StanceInterval>, StanceFilterReport) {
    if intervals.is_empty() {
        return (Vec::new(), StanceFilterReport::default());
    }

    let durations: Vec<f64> = intervals.iter().map(|s| s.duration() as f64).collect();
    let n = durations.len() as f64;
    let mean = durations.iter().sum::<f64>() / n;
    let variance = durations
        .iter()
        .map(|&d| {
            let diff = d - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    let std = variance.sqrt();

    let kept: Vec<StanceInterval> = if std == 0.0 {
        intervals.to_vec()
    } else {
        intervals
            .iter()
            .zip(&durations)
            .filter(|&(_, &d)| (d - mean).abs() < std_factor * std)
            .map(|(interval, _)| *interval)
            .collect()
    };

    let report = StanceFilterReport {
        raw_count: intervals.len(),
        removed: intervals.len() - kept.len(),
        mean_duration: mean,
        std_duration: std,
    };
    (kept, report)
}

/// Detect stance intervals and drop duration outliers.
pub fn get_stance_intervals(
    flight_flag: ArrayView1<f64>,
    criteria: &StanceCriteria,
) -> (Vec<StanceInterval>, StanceFilterReport) {
    let raw = detect_stance_intervals(flight_flag, criteria.min_stance_samples);
    let (filtered, report) = filter_outlier_intervals(&raw, criteria.outlier_std_factor);
    info!("Filtered {} stance intervals", report.removed);
    (filtered, report)
}
