use crate::channels::ChannelRegistry;
use crate::config::PipelineConfig;
use crate::error::GaitError;
use crate::Recording;
use anyhow::{anyhow, Context, Result};
use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::ipc::reader::FileReaderBuilder;
use log::{debug, info, warn};
use ndarray::{concatenate, s, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// CBOR channel payload: a row-major matrix of little-endian `f64`s.
#[derive(Debug, Serialize, Deserialize)]
pub struct CborChannel {
    pub rows: usize,
    pub cols: usize,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl CborChannel {
    pub fn from_matrix(matrix: &Array2<f64>) -> Self {
        Self {
            rows: matrix.nrows(),
            cols: matrix.ncols(),
            data: matrix.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn into_matrix(self) -> Result<Array2<f64>> {
        let values: Vec<f64> = self
            .data
            .chunks_exact(8)
            .map(|chunk| {
                f64::from_le_bytes([
                    chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
                ])
            })
            .collect();
        Array2::from_shape_vec((self.rows, self.cols), values)
            .map_err(|e| anyhow!("CBOR payload does not match {}x{}: {}", self.rows, self.cols, e))
    }
}

/// A channel file that could not be added to the combined matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub file: String,
    pub message: String,
}

#[derive(Debug)]
pub struct LoadedRecording {
    pub recording: Recording,
    pub failures: Vec<LoadFailure>,
}

pub fn read_csv_file(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut values = Vec::new();
    let mut cols = 0;
    let mut rows = 0;

    // The reader rejects rows of unequal length.
    for result in rdr.records() {
        let record = result?;
        cols = record.len();
        for field in record.iter() {
            let value: f64 = field
                .parse()
                .with_context(|| format!("Failed to parse '{}' on row {}", field, rows + 1))?;
            values.push(value);
        }
        rows += 1;
    }

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

pub fn read_feather_file(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let reader = FileReaderBuilder::new().build(file)?;
    let cols = reader.schema().fields().len();
    let mut values = Vec::new();
    let mut rows = 0;

    for batch in reader {
        let batch = batch?;
        let columns = batch
            .columns()
            .iter()
            .map(|column| cast(column, &DataType::Float64))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let columns: Vec<&Float64Array> = columns
            .iter()
            .map(|column| {
                column
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| anyhow!("column did not cast to Float64"))
            })
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            for column in &columns {
                values.push(if column.is_null(row) {
                    f64::NAN
                } else {
                    column.value(row)
                });
            }
        }
        rows += batch.num_rows();
    }

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

pub fn read_cbor_file(path: &Path) -> Result<Array2<f64>> {
    let file = File::open(path)?;
    let channel: CborChannel = ciborium::from_reader(BufReader::new(file))?;
    channel.into_matrix()
}

/// Read a channel payload, picking the decoder from the file extension.
pub fn read_channel_file(path: &Path) -> Result<Array2<f64>> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => read_csv_file(path),
        Some("feather") | Some("arrow") => read_feather_file(path),
        Some("cbor") => read_cbor_file(path),
        other => Err(anyhow!("Unsupported channel file extension: {:?}", other)),
    }
}

/// Append `chunk` to the right of `combined`.
///
/// The chunk repeats one column of its predecessor at the seam, so its
/// trailing column is dropped before the append.
pub fn append_channel(
    combined: &Array2<f64>,
    chunk: &Array2<f64>,
) -> std::result::Result<Array2<f64>, GaitError> {
    let mismatch = GaitError::ShapeMismatch {
        expected: combined.nrows(),
        actual: chunk.nrows(),
    };
    if chunk.nrows() != combined.nrows() {
        return Err(mismatch);
    }
    let kept = chunk.ncols().saturating_sub(1);
    concatenate(Axis(1), &[combined.view(), chunk.slice(s![.., ..kept])]).map_err(|_| mismatch)
}

/// Load every configured channel file of one recording directory.
///
/// A file that is missing, unreadable or the wrong shape is logged, reported
/// in [`LoadedRecording::failures`] and left out; its columns are then absent
/// from the registry.
pub fn load_recording(dir: &Path, config: &PipelineConfig) -> Result<LoadedRecording> {
    let mut combined: Option<Array2<f64>> = None;
    let mut registry = ChannelRegistry::default();
    let mut failures = Vec::new();

    for channel_file in &config.channel_files {
        let path = dir.join(&channel_file.file);
        debug!("Loading channel file: {}", path.display());

        let chunk = match read_channel_file(&path) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("{}: {:#}", channel_file.file, e);
                failures.push(LoadFailure {
                    file: channel_file.file.clone(),
                    message: format!("{:#}", e),
                });
                continue;
            }
        };

        let first_column = combined.as_ref().map_or(0, |c| c.ncols());
        let added = if combined.is_some() {
            chunk.ncols().saturating_sub(1)
        } else {
            chunk.ncols()
        };
        if added < channel_file.columns.len() {
            let message = format!(
                "provides {} columns, {} expected",
                added,
                channel_file.columns.len()
            );
            warn!("{}: {}", channel_file.file, message);
            failures.push(LoadFailure {
                file: channel_file.file.clone(),
                message,
            });
            continue;
        }

        let next = match &combined {
            Some(previous) => append_channel(previous, &chunk),
            None => Ok(chunk),
        };
        match next {
            Ok(next) => {
                for (offset, name) in channel_file.columns.iter().enumerate() {
                    registry.insert(name.clone(), first_column + offset);
                }
                combined = Some(next);
            }
            Err(e) => {
                warn!("{}: {}", channel_file.file, e);
                failures.push(LoadFailure {
                    file: channel_file.file.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    let data = combined
        .ok_or(GaitError::EmptyRecording)
        .with_context(|| format!("No channel data loaded from {}", dir.display()))?;

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    info!(
        "Loaded {}: {} samples x {} columns ({} channel files failed)",
        name,
        data.nrows(),
        data.ncols(),
        failures.len()
    );

    Ok(LoadedRecording {
        recording: Recording {
            name,
            data,
            channels: registry,
        },
        failures,
    })
}

/// Directories under `root` (itself included) holding at least one configured
/// channel file, sorted by path.
pub fn find_recordings(root: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let mut recordings = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if config
            .channel_files
            .iter()
            .any(|f| dir.join(&f.file).is_file())
        {
            recordings.push(dir.to_path_buf());
        }
    }

    recordings.sort();
    Ok(recordings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn seam_column_of_later_chunk_is_dropped() {
        let first = array![[0.0, 5.0], [0.001, 6.0]];
        let second = array![[1.0, 0.0], [2.0, 0.001]];
        let combined = append_channel(&first, &second).unwrap();
        assert_eq!(combined, array![[0.0, 5.0, 1.0], [0.001, 6.0, 2.0]]);
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let first = array![[0.0, 5.0], [0.001, 6.0]];
        let second = array![[1.0, 0.0]];
        assert_eq!(
            append_channel(&first, &second),
            Err(GaitError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn csv_payload_is_read_row_major() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grf.csv");
        std::fs::write(&path, "0.000, 1.5\n0.001, 2.5\n0.002, -3\n").unwrap();

        let matrix = read_channel_file(&path).unwrap();
        assert_eq!(matrix, array![[0.0, 1.5], [0.001, 2.5], [0.002, -3.0]]);
    }

    #[test]
    fn malformed_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grf.csv");
        std::fs::write(&path, "0.0,1.0\n0.1,abc\n").unwrap();
        assert!(read_channel_file(&path).is_err());
    }

    #[test]
    fn cbor_payload_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kneePos.cbor");
        let matrix = array![[12.5, 0.0], [13.0, 0.001], [14.25, 0.002]];
        let file = File::create(&path).unwrap();
        ciborium::into_writer(&CborChannel::from_matrix(&matrix), file).unwrap();

        assert_eq!(read_channel_file(&path).unwrap(), matrix);
    }

    #[test]
    fn truncated_cbor_payload_is_an_error() {
        let channel = CborChannel {
            rows: 2,
            cols: 2,
            data: vec![0; 24],
        };
        assert!(channel.into_matrix().is_err());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grf.mat");
        std::fs::write(&path, b"MATLAB 5.0").unwrap();
        assert!(read_channel_file(&path).is_err());
    }
}
