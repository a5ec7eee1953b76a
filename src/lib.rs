pub mod channels;
pub mod config;
pub mod data_loading;
pub mod error;
pub mod output;
pub mod phase_analysis;
pub mod stance_detection;
pub mod statistics;
pub mod trajectory;

use channels::ChannelRegistry;
use config::PipelineConfig;
use error::{GaitError, Result};
use log::info;
use ndarray::Array2;
use stance_detection::StanceFilterReport;
use statistics::StepStatistics;

/// Inclusive `(start, end)` row range during which the limb bears load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceInterval {
    pub start: usize,
    pub end: usize,
}

impl StanceInterval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `end - start`, the quantity the outlier filter works on.
    pub fn duration(&self) -> usize {
        self.end - self.start
    }

    pub fn sample_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// One stance phase plus its inferred swing phase. `end` is exclusive when
/// the interval is used to slice a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInterval {
    pub start: usize,
    pub end: usize,
}

impl StepInterval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// A raw signal matrix together with the registry describing its columns.
#[derive(Debug, Clone)]
pub struct Recording {
    pub name: String,
    pub data: Array2<f64>,
    pub channels: ChannelRegistry,
}

#[derive(Debug, Clone)]
pub struct GaitAnalysis {
    pub recording: String,
    pub stance_intervals: Vec<StanceInterval>,
    pub stance_report: StanceFilterReport,
    pub swing_phase_size: usize,
    pub step_intervals: Vec<StepInterval>,
    pub knee_angles: Array2<f64>,
    pub statistics: StepStatistics,
}

/// Run stance detection, step building, trajectory normalisation and the
/// cross-step statistics over one recording.
pub fn analyze_recording(recording: &Recording, config: &PipelineConfig) -> Result<GaitAnalysis> {
    if recording.data.nrows() == 0 {
        return Err(GaitError::EmptyRecording);
    }

    let flight_flag = recording
        .channels
        .column(&recording.data, &config.flight_channel)?;
    let (stance_intervals, stance_report) =
        stance_detection::get_stance_intervals(flight_flag, &config.stance_criteria());

    let (swing_phase_size, step_intervals) = phase_analysis::get_step_intervals(&stance_intervals)?;
    info!(
        "{}: {} stance intervals, swing phase of {} samples",
        recording.name,
        stance_intervals.len(),
        swing_phase_size
    );

    let knee_angle = recording
        .channels
        .column(&recording.data, &config.knee_channel)?;
    let knee_angles = trajectory::get_padded_knee_angle_vectors(
        knee_angle,
        &step_intervals,
        &config.normalization(),
    )?;

    let statistics = statistics::compute_step_statistics(&knee_angles, config.sampling_rate_hz)?;

    Ok(GaitAnalysis {
        recording: recording.name.clone(),
        stance_intervals,
        stance_report,
        swing_phase_size,
        step_intervals,
        knee_angles,
        statistics,
    })
}
