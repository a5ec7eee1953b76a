use crate::error::{GaitError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashMap;

/// Layout version of [`ChannelRegistry::standard`]. Bump together with the
/// default channel-file list in `config.rs`.
pub const REGISTRY_VERSION: u32 = 1;

pub const TIME: &str = "time";
pub const GRF: &str = "grf";
pub const HIP_POSITION: &str = "hipPos";
pub const IS_FLIGHT: &str = "isFlight";
pub const KNEE_ANGLE: &str = "kneeAngle";
pub const MOTOR_CURRENT: &str = "motCurr";
pub const PRESSURE: &str = "pressure";
pub const SAFETY: &str = "safety";

const STANDARD_LAYOUT: [(&str, usize); 8] = [
    (TIME, 0),
    (GRF, 1),
    (HIP_POSITION, 2),
    (IS_FLIGHT, 3),
    (KNEE_ANGLE, 4),
    (MOTOR_CURRENT, 5),
    (PRESSURE, 6),
    (SAFETY, 7),
];

/// Maps semantic channel names to column offsets of the raw signal matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelRegistry {
    columns: HashMap<String, usize>,
}

impl ChannelRegistry {
    /// Layout produced when every default channel file loads.
    pub fn standard() -> Self {
        Self::from_layout(STANDARD_LAYOUT)
    }

    pub fn from_layout<I, S>(layout: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self {
            columns: layout
                .into_iter()
                .map(|(name, column)| (name.into(), column))
                .collect(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, column: usize) {
        self.columns.insert(name.into(), column);
    }

    pub fn index(&self, name: &str) -> Result<usize> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| GaitError::ChannelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Channel names ordered by column.
    pub fn names(&self) -> Vec<&str> {
        let mut entries: Vec<(&str, usize)> = self
            .columns
            .iter()
            .map(|(name, &column)| (name.as_str(), column))
            .collect();
        entries.sort_by_key(|&(_, column)| column);
        entries.into_iter().map(|(name, _)| name).collect()
    }

    /// Borrow the named channel out of `matrix`.
    pub fn column<'a>(&self, matrix: &'a Array2<f64>, name: &str) -> Result<ArrayView1<'a, f64>> {
        let index = self.index(name)?;
        if index >= matrix.ncols() {
            return Err(GaitError::ChannelNotFound(format!(
                "{} (column {} of a {}-column matrix)",
                name,
                index,
                matrix.ncols()
            )));
        }
        Ok(matrix.index_axis(Axis(1), index))
    }
}
