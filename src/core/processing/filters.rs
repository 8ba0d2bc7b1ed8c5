//! Dataset-assembly filters applied to averaged tiles.
//!
//! These run after [`average_tile`](super::averager::average_tile) accepted a tile
//! and look at the derived coverage metrics together with the metadata row.
use serde::{Deserialize, Serialize};

use crate::core::processing::averager::TileAverages;
use crate::io::metadata::TileRecord;
use crate::types::RejectReason;

/// Optional thresholds; `None` disables a check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFilter {
    pub min_fraction_valid: Option<f64>,
    /// Upper bound on the missing-reflectance fraction (cloud cover)
    pub max_missing_fraction: Option<f64>,
    pub min_sif: Option<f64>,
    pub min_num_soundings: Option<f64>,
}

impl DatasetFilter {
    pub fn is_empty(&self) -> bool {
        self.min_fraction_valid.is_none()
            && self.max_missing_fraction.is_none()
            && self.min_sif.is_none()
            && self.min_num_soundings.is_none()
    }

    /// First failing check, in declaration order.
    pub fn check(&self, record: &TileRecord, averages: &TileAverages) -> Option<RejectReason> {
        if let Some(min) = self.min_fraction_valid {
            let fraction_valid = averages.fraction_valid();
            if fraction_valid < min {
                return Some(RejectReason::LowFractionValid {
                    fraction_valid,
                    min,
                });
            }
        }
        if let Some(max) = self.max_missing_fraction {
            let missing = averages.missing_fraction();
            if missing > max {
                return Some(RejectReason::TooMuchMissing { missing, max });
            }
        }
        if let Some(min) = self.min_sif {
            if record.sif < min {
                return Some(RejectReason::LowSif {
                    sif: record.sif,
                    min,
                });
            }
        }
        if let Some(min) = self.min_num_soundings {
            match record.num_soundings {
                Some(n) if n >= min => {}
                num_soundings => {
                    return Some(RejectReason::FewSoundings { num_soundings, min });
                }
            }
        }
        None
    }
}
