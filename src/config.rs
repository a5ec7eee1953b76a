use crate::channels;
use crate::error::{GaitError, Result};
use crate::stance_detection::StanceCriteria;
use crate::trajectory::NormalizationOptions;
use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extract gait-cycle statistics from exoskeleton recordings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Recording directory, or a directory of recordings with --recursive
    #[arg(help = "Recording directory, or a directory of recordings with --recursive")]
    pub input_path: PathBuf,

    /// JSON pipeline configuration; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Process every recording directory found under the input path
    #[arg(long)]
    pub recursive: bool,

    /// Sampling rate of the recording in Hz (default 1000)
    #[arg(long, env = "GAIT_SAMPLING_RATE")]
    pub sampling_rate: Option<f64>,

    /// Shortest stance phase in samples (default 100)
    #[arg(long)]
    pub min_stance_samples: Option<usize>,

    /// Reject stance intervals this many standard deviations from the mean duration (default 2.0)
    #[arg(long)]
    pub outlier_std_factor: Option<f64>,

    /// Report knee angle as extension (180 - angle)
    #[arg(long)]
    pub extension_angle: bool,

    /// Keep the first (warm-up) step in the averaged steps
    #[arg(long)]
    pub include_first_step: bool,

    /// Channel holding the knee angle
    #[arg(long)]
    pub knee_channel: Option<String>,

    /// Channel holding the flight flag
    #[arg(long)]
    pub flight_channel: Option<String>,

    /// CSV output file prefix (e.g. /path/to/output/prefix)
    #[arg(long)]
    pub csv_output: Option<String>,

    /// Also write the padded per-step knee-angle matrix next to the statistics
    #[arg(long)]
    pub write_steps: bool,
}

/// One per-channel file of a recording and the names of the columns it adds
/// to the combined matrix, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFile {
    pub file: String,
    pub columns: Vec<String>,
}

impl ChannelFile {
    pub fn new(file: &str, columns: &[&str]) -> Self {
        Self {
            file: file.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Files in load order. Must stay in step with [`channels::ChannelRegistry::standard`].
pub fn default_channel_files() -> Vec<ChannelFile> {
    vec![
        ChannelFile::new("grf.csv", &[channels::TIME, channels::GRF]),
        ChannelFile::new("hipPos.csv", &[channels::HIP_POSITION]),
        ChannelFile::new("isFlight.csv", &[channels::IS_FLIGHT]),
        ChannelFile::new("kneePos.csv", &[channels::KNEE_ANGLE]),
        ChannelFile::new("motCurr.csv", &[channels::MOTOR_CURRENT]),
        ChannelFile::new("pressure.csv", &[channels::PRESSURE]),
        ChannelFile::new("safety.csv", &[channels::SAFETY]),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub channel_files: Vec<ChannelFile>,
    pub flight_channel: String,
    pub knee_channel: String,
    pub sampling_rate_hz: f64,
    pub min_stance_samples: usize,
    pub outlier_std_factor: f64,
    pub convert_to_extension: bool,
    pub include_first_step: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let criteria = StanceCriteria::default();
        Self {
            channel_files: default_channel_files(),
            flight_channel: channels::IS_FLIGHT.to_string(),
            knee_channel: channels::KNEE_ANGLE.to_string(),
            sampling_rate_hz: 1000.0,
            min_stance_samples: criteria.min_stance_samples,
            outlier_std_factor: criteria.outlier_std_factor,
            convert_to_extension: false,
            include_first_step: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Build the configuration for a run: JSON file if given, then flags.
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_json(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(rate) = args.sampling_rate {
            self.sampling_rate_hz = rate;
        }
        if let Some(min) = args.min_stance_samples {
            self.min_stance_samples = min;
        }
        if let Some(factor) = args.outlier_std_factor {
            self.outlier_std_factor = factor;
        }
        if let Some(channel) = &args.knee_channel {
            self.knee_channel = channel.clone();
        }
        if let Some(channel) = &args.flight_channel {
            self.flight_channel = channel.clone();
        }
        self.convert_to_extension |= args.extension_angle;
        self.include_first_step |= args.include_first_step;
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_files.is_empty() {
            return Err(GaitError::InvalidConfig("no channel files configured".into()));
        }
        if let Some(file) = self.channel_files.iter().find(|f| f.columns.is_empty()) {
            return Err(GaitError::InvalidConfig(format!(
                "channel file {} names no columns",
                file.file
            )));
        }
        if !(self.sampling_rate_hz > 0.0) {
            return Err(GaitError::InvalidConfig(format!(
                "sampling_rate_hz must be positive, got {}",
                self.sampling_rate_hz
            )));
        }
        if self.min_stance_samples == 0 {
            return Err(GaitError::InvalidConfig(
                "min_stance_samples must be at least 1".into(),
            ));
        }
        if !(self.outlier_std_factor > 0.0) {
            return Err(GaitError::InvalidConfig(format!(
                "outlier_std_factor must be positive, got {}",
                self.outlier_std_factor
            )));
        }
        Ok(())
    }

    pub fn stance_criteria(&self) -> StanceCriteria {
        StanceCriteria {
            min_stance_samples: self.min_stance_samples,
            outlier_std_factor: self.outlier_std_factor,
        }
    }

    pub fn normalization(&self) -> NormalizationOptions {
        NormalizationOptions {
            convert_to_extension: self.convert_to_extension,
            include_first_step: self.include_first_step,
        }
    }
}
