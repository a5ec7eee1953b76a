use anyhow::Context;
use clap::Parser;
use gait_decoder::config::{Args, PipelineConfig};
use gait_decoder::{analyze_recording, data_loading, output, GaitAnalysis};
use log::{error, info};
use std::path::{Path, PathBuf};

fn print_summary(analysis: &GaitAnalysis, sampling_rate_hz: f64) {
    let report = &analysis.stance_report;
    println!("\nRecording {}:", analysis.recording);
    println!(
        "  Stance intervals: {} detected, {} filtered as outliers (mean {:.1} ± {:.1} samples)",
        report.raw_count, report.removed, report.mean_duration, report.std_duration
    );
    println!(
        "  Swing phase: {} samples ({:.3} s)",
        analysis.swing_phase_size,
        analysis.swing_phase_size as f64 / sampling_rate_hz
    );
    println!(
        "  Steps averaged: {} of {}, {} samples each",
        analysis.statistics.step_count,
        analysis.step_intervals.len(),
        analysis.knee_angles.ncols()
    );

    let mean = &analysis.statistics.mean;
    if let (Some(min), Some(max)) = (
        mean.iter().cloned().reduce(f64::min),
        mean.iter().cloned().reduce(f64::max),
    ) {
        println!("  Mean knee angle range: {:.2} to {:.2} deg", min, max);
    }
}

fn process_recording(dir: &Path, config: &PipelineConfig, args: &Args) -> anyhow::Result<()> {
    let loaded = data_loading::load_recording(dir, config)?;
    for failure in &loaded.failures {
        println!("  Skipped {}: {}", failure.file, failure.message);
    }

    let analysis = analyze_recording(&loaded.recording, config)
        .with_context(|| format!("Failed to analyse {}", dir.display()))?;
    print_summary(&analysis, config.sampling_rate_hz);

    if let Some(base_path) = &args.csv_output {
        output::write_statistics_csv(base_path, &analysis.recording, &analysis.statistics)?;
        if args.write_steps {
            output::write_step_matrix_csv(base_path, &analysis.recording, &analysis.knee_angles)?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();
    let config = PipelineConfig::from_args(&args)?;

    let recordings: Vec<PathBuf> = if args.recursive {
        data_loading::find_recordings(&args.input_path, &config)?
    } else {
        vec![args.input_path.clone()]
    };
    info!("Processing {} recording(s)", recordings.len());

    if recordings.is_empty() {
        println!("No recordings found under {}", args.input_path.display());
        return Ok(());
    }

    let mut failed = 0;
    for dir in &recordings {
        if let Err(e) = process_recording(dir, &config, &args) {
            // Each recording stands alone; keep going in recursive mode.
            error!("{:#}", e);
            if !args.recursive {
                return Err(e);
            }
            failed += 1;
        }
    }

    if failed > 0 {
        println!("\n{} of {} recordings failed", failed, recordings.len());
    }

    Ok(())
}
