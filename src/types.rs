//! Shared types and enums used across SIFTILE.
//! Includes the per-tile `TileOutcome`, the `RejectReason` taxonomy with its stable
//! reason codes, and the `InputFormat` selector for tile files.
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::processing::averager::TileAverages;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Choose by file extension (`.npy`, `.tif`/`.tiff`)
    Auto,
    Npy,
    #[value(name = "geotiff")]
    GeoTiff,
}

impl InputFormat {
    /// Resolve `Auto` against a concrete path. Returns `None` for unknown extensions.
    pub fn resolve(self, path: &Path) -> Option<InputFormat> {
        match self {
            InputFormat::Auto => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_ascii_lowercase();
                match ext.as_str() {
                    "npy" => Some(InputFormat::Npy),
                    "tif" | "tiff" => Some(InputFormat::GeoTiff),
                    _ => None,
                }
            }
            other => Some(other),
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Auto => write!(f, "auto"),
            InputFormat::Npy => write!(f, "npy"),
            InputFormat::GeoTiff => write!(f, "geotiff"),
        }
    }
}

/// Why a tile (or a dataset row built from it) was dropped.
///
/// The first four variants come from the averager itself; the rest are
/// raised while assembling a dataset.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// Tile is empty, lacks a configured channel, or has a non-binary missing indicator.
    InvalidTileShape { detail: String },
    /// No pixel has a valid reflectance value.
    AllPixelsOccluded,
    /// A channel average came out as NaN.
    CorruptAverage { channel: usize },
    /// Land-cover fractions do not cover enough of the tile.
    InsufficientCoverage { coverage: f64, min_coverage: f64 },
    LowFractionValid { fraction_valid: f64, min: f64 },
    TooMuchMissing { missing: f64, max: f64 },
    LowSif { sif: f64, min: f64 },
    FewSoundings { num_soundings: Option<f64>, min: f64 },
    /// Tile file could not be read.
    LoadFailed { detail: String },
}

impl RejectReason {
    /// Short, stable reason code used for logs and report aggregation.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidTileShape { .. } => "invalid_tile_shape",
            RejectReason::AllPixelsOccluded => "all_pixels_occluded",
            RejectReason::CorruptAverage { .. } => "corrupt_average",
            RejectReason::InsufficientCoverage { .. } => "insufficient_coverage",
            RejectReason::LowFractionValid { .. } => "low_fraction_valid",
            RejectReason::TooMuchMissing { .. } => "too_much_missing",
            RejectReason::LowSif { .. } => "low_sif",
            RejectReason::FewSoundings { .. } => "few_soundings",
            RejectReason::LoadFailed { .. } => "load_failed",
        }
    }

    pub(crate) fn invalid_shape(detail: impl Into<String>) -> Self {
        RejectReason::InvalidTileShape {
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::InvalidTileShape { detail } => write!(f, "invalid tile: {}", detail),
            RejectReason::AllPixelsOccluded => write!(f, "no pixel has valid reflectance"),
            RejectReason::CorruptAverage { channel } => {
                write!(f, "average of channel {} is NaN", channel)
            }
            RejectReason::InsufficientCoverage {
                coverage,
                min_coverage,
            } => write!(
                f,
                "land cover coverage {:.4} below minimum {:.4}",
                coverage, min_coverage
            ),
            RejectReason::LowFractionValid {
                fraction_valid,
                min,
            } => write!(
                f,
                "fraction valid {:.4} below minimum {:.4}",
                fraction_valid, min
            ),
            RejectReason::TooMuchMissing { missing, max } => {
                write!(f, "missing fraction {:.4} above maximum {:.4}", missing, max)
            }
            RejectReason::LowSif { sif, min } => {
                write!(f, "SIF {:.4} below minimum {:.4}", sif, min)
            }
            RejectReason::FewSoundings { num_soundings, min } => match num_soundings {
                Some(n) => write!(f, "{} soundings below minimum {}", n, min),
                None => write!(f, "no sounding count (minimum {})", min),
            },
            RejectReason::LoadFailed { detail } => write!(f, "load failed: {}", detail),
        }
    }
}

/// Result of averaging one tile.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TileOutcome {
    Accepted(TileAverages),
    Rejected(RejectReason),
}

impl TileOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TileOutcome::Accepted(_))
    }

    pub fn accepted(self) -> Option<TileAverages> {
        match self {
            TileOutcome::Accepted(avg) => Some(avg),
            TileOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            TileOutcome::Accepted(_) => None,
            TileOutcome::Rejected(reason) => Some(reason),
        }
    }
}
