use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Standard scores beyond this are clipped when standardizing dataset rows.
pub const DEFAULT_STANDARDIZE_CLIP: f64 = 3.0;

/// Per-column mean and population standard deviation over dataset rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStatistics {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl BandStatistics {
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::Processing(
                "band statistics need at least one row".to_string(),
            ));
        }
        let width = columns.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::Processing(format!(
                "row has {} values, expected {}",
                bad.len(),
                width
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let table = Array2::from_shape_vec((rows.len(), width), flat).map_err(Error::processing)?;
        let mean = table
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::Processing("empty table".to_string()))?;
        let std = table.std_axis(Axis(0), 0.0);
        Ok(Self {
            columns,
            mean: mean.to_vec(),
            std: std.to_vec(),
        })
    }

    pub fn get(&self, column: &str) -> Option<(f64, f64)> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some((self.mean[idx], self.std[idx]))
    }

    /// Standardize a row column by column. Values past the last column are dropped.
    pub fn standardize_row(&self, row: &[f64], clip: f64) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(&v, (&mean, &std))| standardize(v, mean, std, clip))
            .collect()
    }
}

/// `(value - mean) / std`, clipped to `[-clip, clip]`. A zero std maps everything to 0.
pub fn standardize(value: f64, mean: f64, std: f64, clip: f64) -> f64 {
    if std == 0.0 {
        return 0.0;
    }
    ((value - mean) / std).clamp(-clip, clip)
}
