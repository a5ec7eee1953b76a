use crate::statistics::StepStatistics;
use anyhow::Result;
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// `<dir>/<stem>_<recording>_<kind>.<ext>` from a prefix such as
/// `/path/to/output/prefix.csv`.
fn output_path(base_path: &str, recording: &str, kind: &str) -> Result<PathBuf> {
    let path = Path::new(base_path);
    let dir = path.parent().unwrap_or(Path::new("."));

    // Create directory if it doesn't exist
    std::fs::create_dir_all(dir)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");

    let filename = format!("{}_{}_{}.{}", stem, recording, kind, ext);
    Ok(dir.join(filename))
}

pub fn write_statistics_csv(
    base_path: &str,
    recording: &str,
    stats: &StepStatistics,
) -> Result<PathBuf> {
    let full_path = output_path(base_path, recording, "knee_angle")?;

    println!("Writing results to {}", full_path.display());
    let file = std::fs::File::create(&full_path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["time_s", "mean", "std", "ci_low", "ci_high"])?;

    let lower = stats.lower();
    let upper = stats.upper();
    for i in 0..stats.mean.len() {
        writer.write_record(&[
            stats.time[i].to_string(),
            stats.mean[i].to_string(),
            stats.std[i].to_string(),
            lower[i].to_string(),
            upper[i].to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(full_path)
}

/// One row per step, one column per sample offset.
pub fn write_step_matrix_csv(
    base_path: &str,
    recording: &str,
    steps: &Array2<f64>,
) -> Result<PathBuf> {
    let full_path = output_path(base_path, recording, "steps")?;

    println!("Writing steps to {}", full_path.display());
    let file = std::fs::File::create(&full_path)?;
    let mut writer = csv::Writer::from_writer(file);

    for row in steps.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::compute_step_statistics;
    use ndarray::array;

    #[test]
    fn statistics_csv_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("out").join("gait.csv");
        let steps = array![[10.0, 20.0, 30.0], [12.0, 22.0, 30.0]];
        let stats = compute_step_statistics(&steps, 1000.0).unwrap();

        let path = write_statistics_csv(prefix.to_str().unwrap(), "10131426", &stats).unwrap();
        assert_eq!(path.file_name().unwrap(), "gait_10131426_knee_angle.csv");

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        assert_eq!(headers, vec!["time_s", "mean", "std", "ci_low", "ci_high"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "11");
        assert_eq!(&rows[2][2], "0");
    }

    #[test]
    fn step_matrix_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("gait.csv");
        let steps = array![[1.0, 2.0], [3.5, 4.0]];

        let path = write_step_matrix_csv(prefix.to_str().unwrap(), "rec", &steps).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["1,2", "3.5,4"]);
    }
}
