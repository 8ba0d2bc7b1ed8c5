//! Masked per-channel averaging of a tile.
//!
//! Occlusion-sensitive channels (reflectance) are averaged over the pixels whose
//! missing indicator is 0; every other channel, the indicator included, is averaged
//! over all pixels. The outcome is checked in a fixed order: no valid pixel, NaN
//! average, then land-cover coverage.
use ndarray::{Array1, Array2, ArrayView3, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::core::params::AveragingConfig;
use crate::types::{RejectReason, TileOutcome};

/// Per-channel averages of an accepted tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileAverages {
    pub values: Array1<f64>,
    pub missing_channel: usize,
    pub valid_pixels: usize,
    pub total_pixels: usize,
}

impl TileAverages {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<f64> {
        self.values.get(channel).copied()
    }

    /// Share of pixels lacking reflectance (average of the missing indicator).
    /// An indicator index outside `values` counts as fully missing.
    pub fn missing_fraction(&self) -> f64 {
        self.get(self.missing_channel).unwrap_or(1.0)
    }

    /// 1 - missing fraction; in [0, 1] for a binary indicator.
    pub fn fraction_valid(&self) -> f64 {
        1.0 - self.missing_fraction()
    }

    /// Sum of the averages of `channels`. Out-of-range indices are ignored.
    pub fn coverage(&self, channels: &[usize]) -> f64 {
        channels.iter().filter_map(|&c| self.get(c)).sum()
    }
}

/// Average a (channel, row, column) tile under `config`.
pub fn average_tile(tile: ArrayView3<'_, f64>, config: &AveragingConfig) -> TileOutcome {
    let (channels, rows, cols) = tile.dim();
    if channels == 0 || rows == 0 || cols == 0 {
        return TileOutcome::Rejected(RejectReason::invalid_shape(format!(
            "empty tile {}x{}x{}",
            channels, rows, cols
        )));
    }

    let missing_channel = match config.missing_channel_for(channels) {
        Some(idx) if idx < channels => idx,
        other => {
            return TileOutcome::Rejected(RejectReason::invalid_shape(format!(
                "missing indicator channel {:?} absent from {} channels",
                other, channels
            )));
        }
    };
    if let Some(&bad) = config
        .occlusion_sensitive_channels
        .iter()
        .chain(config.land_cover_channels.iter())
        .find(|&&c| c >= channels)
    {
        return TileOutcome::Rejected(RejectReason::invalid_shape(format!(
            "configured channel {} absent from {} channels",
            bad, channels
        )));
    }

    let indicator = tile.index_axis(Axis(0), missing_channel);
    let mut valid = Array2::<bool>::from_elem((rows, cols), false);
    let mut valid_pixels = 0usize;
    for ((r, c), &flag) in indicator.indexed_iter() {
        if flag == 0.0 {
            valid[[r, c]] = true;
            valid_pixels += 1;
        } else if flag != 1.0 {
            return TileOutcome::Rejected(RejectReason::invalid_shape(format!(
                "missing indicator {} at ({}, {}) is not 0 or 1",
                flag, r, c
            )));
        }
    }

    if valid_pixels == 0 {
        return TileOutcome::Rejected(RejectReason::AllPixelsOccluded);
    }

    let mut sensitive = vec![false; channels];
    for &c in &config.occlusion_sensitive_channels {
        sensitive[c] = true;
    }

    let total_pixels = rows * cols;
    let mut values = Array1::<f64>::zeros(channels);
    for (channel, band) in tile.axis_iter(Axis(0)).enumerate() {
        values[channel] = if sensitive[channel] {
            let mut sum = 0.0;
            Zip::from(&band).and(&valid).for_each(|&v, &ok| {
                if ok {
                    sum += v;
                }
            });
            sum / valid_pixels as f64
        } else {
            band.sum() / total_pixels as f64
        };
    }

    if let Some(channel) = values.iter().position(|v| v.is_nan()) {
        return TileOutcome::Rejected(RejectReason::CorruptAverage { channel });
    }

    let averages = TileAverages {
        values,
        missing_channel,
        valid_pixels,
        total_pixels,
    };

    if let Some(min_coverage) = config.min_coverage {
        let coverage = averages.coverage(&config.land_cover_channels);
        if coverage < min_coverage {
            return TileOutcome::Rejected(RejectReason::InsufficientCoverage {
                coverage,
                min_coverage,
            });
        }
    }

    TileOutcome::Accepted(averages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array3, s};

    /// 2 reflectance channels + missing indicator, no land cover.
    fn small_config() -> AveragingConfig {
        AveragingConfig {
            occlusion_sensitive_channels: vec![0, 1],
            missing_indicator_channel: None,
            land_cover_channels: vec![],
            min_coverage: None,
        }
    }

    fn scenario_tile() -> Array3<f64> {
        let mut tile = Array3::<f64>::zeros((3, 2, 2));
        tile.slice_mut(s![0, .., ..])
            .assign(&ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        tile.slice_mut(s![1, .., ..])
            .assign(&ndarray::arr2(&[[5.0, 6.0], [7.0, 8.0]]));
        tile.slice_mut(s![2, .., ..])
            .assign(&ndarray::arr2(&[[0.0, 0.0], [1.0, 0.0]]));
        tile
    }

    fn accepted(outcome: TileOutcome) -> TileAverages {
        match outcome {
            TileOutcome::Accepted(avg) => avg,
            TileOutcome::Rejected(reason) => panic!("tile rejected: {}", reason),
        }
    }

    #[test]
    fn one_occluded_pixel_is_excluded_from_reflectance() {
        let avg = accepted(average_tile(scenario_tile().view(), &small_config()));
        assert_abs_diff_eq!(avg.values[0], 7.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(avg.values[1], 19.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(avg.values[2], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(avg.fraction_valid(), 0.75, epsilon = 1e-12);
        assert_eq!(avg.valid_pixels, 3);
        assert_eq!(avg.total_pixels, 4);
    }

    #[test]
    fn fully_valid_tile_matches_plain_mean() {
        let mut tile = scenario_tile();
        tile.slice_mut(s![2, .., ..]).fill(0.0);
        let avg = accepted(average_tile(tile.view(), &small_config()));
        let plain = tile.mean_axis(Axis(2)).unwrap().mean_axis(Axis(1)).unwrap();
        for c in 0..3 {
            assert_abs_diff_eq!(avg.values[c], plain[c], epsilon = 1e-12);
        }
        assert_eq!(avg.fraction_valid(), 1.0);
    }

    #[test]
    fn fully_occluded_tile_is_rejected() {
        let mut tile = scenario_tile();
        tile.slice_mut(s![2, .., ..]).fill(1.0);
        // Even NaN reflectance does not matter once every pixel is occluded
        tile[[0, 0, 0]] = f64::NAN;
        assert_eq!(
            average_tile(tile.view(), &small_config()),
            TileOutcome::Rejected(RejectReason::AllPixelsOccluded)
        );
    }

    #[test]
    fn nan_in_unmasked_channel_is_corrupt() {
        let mut tile = Array3::<f64>::zeros((4, 2, 2));
        tile[[2, 1, 1]] = f64::NAN;
        let config = AveragingConfig {
            occlusion_sensitive_channels: vec![0],
            ..small_config()
        };
        assert_eq!(
            average_tile(tile.view(), &config),
            TileOutcome::Rejected(RejectReason::CorruptAverage { channel: 2 })
        );
    }

    #[test]
    fn nan_under_occluded_pixel_is_ignored_for_reflectance() {
        let mut tile = scenario_tile();
        tile[[0, 1, 0]] = f64::NAN;
        let avg = accepted(average_tile(tile.view(), &small_config()));
        assert_abs_diff_eq!(avg.values[0], 7.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn low_land_cover_is_rejected_after_averaging() {
        // channel 0 reflectance, 1..3 land cover, 3 missing indicator
        let mut tile = Array3::<f64>::zeros((4, 2, 2));
        tile.slice_mut(s![0, .., ..]).fill(0.2);
        tile.slice_mut(s![1, .., ..]).fill(0.1);
        tile.slice_mut(s![2, .., ..]).fill(0.2);
        let config = AveragingConfig {
            occlusion_sensitive_channels: vec![0],
            missing_indicator_channel: Some(3),
            land_cover_channels: vec![1, 2],
            min_coverage: Some(0.5),
        };
        match average_tile(tile.view(), &config) {
            TileOutcome::Rejected(RejectReason::InsufficientCoverage {
                coverage,
                min_coverage,
            }) => {
                assert_abs_diff_eq!(coverage, 0.3, epsilon = 1e-12);
                assert_eq!(min_coverage, 0.5);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let relaxed = AveragingConfig {
            min_coverage: Some(0.25),
            ..config
        };
        assert!(average_tile(tile.view(), &relaxed).is_accepted());
    }

    #[test]
    fn occlusion_is_checked_before_nan_and_coverage() {
        let mut tile = Array3::<f64>::zeros((3, 2, 2));
        tile.slice_mut(s![2, .., ..]).fill(1.0);
        tile[[1, 0, 0]] = f64::NAN;
        let config = AveragingConfig {
            occlusion_sensitive_channels: vec![0],
            missing_indicator_channel: Some(2),
            land_cover_channels: vec![1],
            min_coverage: Some(0.9),
        };
        assert_eq!(
            average_tile(tile.view(), &config),
            TileOutcome::Rejected(RejectReason::AllPixelsOccluded)
        );
    }

    #[test]
    fn shape_problems_are_invalid_tile_shape() {
        let empty = Array3::<f64>::zeros((3, 0, 2));
        let outcome = average_tile(empty.view(), &small_config());
        assert_eq!(outcome.rejection().map(|r| r.code()), Some("invalid_tile_shape"));

        let config = AveragingConfig {
            missing_indicator_channel: Some(5),
            ..small_config()
        };
        let outcome = average_tile(scenario_tile().view(), &config);
        assert_eq!(outcome.rejection().map(|r| r.code()), Some("invalid_tile_shape"));

        let config = AveragingConfig {
            land_cover_channels: vec![7],
            ..small_config()
        };
        let outcome = average_tile(scenario_tile().view(), &config);
        assert_eq!(outcome.rejection().map(|r| r.code()), Some("invalid_tile_shape"));
    }

    #[test]
    fn non_binary_indicator_is_invalid() {
        let mut tile = scenario_tile();
        tile[[2, 0, 1]] = 0.5;
        let outcome = average_tile(tile.view(), &small_config());
        assert_eq!(outcome.rejection().map(|r| r.code()), Some("invalid_tile_shape"));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tile = scenario_tile();
        let first = average_tile(tile.view(), &small_config());
        let second = average_tile(tile.view(), &small_config());
        assert_eq!(first, second);
    }

    #[test]
    fn pixel_order_does_not_matter() {
        let mut tile = Array3::<f64>::zeros((3, 3, 4));
        for ((c, r, k), v) in tile.indexed_iter_mut() {
            *v = match c {
                2 => ((r + k) % 3 == 0) as u8 as f64,
                _ => (c * 17 + r * 5 + k * 3) as f64 * 0.37,
            };
        }
        let flipped = tile.slice(s![.., ..;-1, ..;-1]).to_owned();
        let mut swapped = tile.clone();
        swapped.swap_axes(1, 2);
        let swapped = swapped.as_standard_layout().to_owned();

        let base = accepted(average_tile(tile.view(), &small_config()));
        for other in [flipped, swapped] {
            let avg = accepted(average_tile(other.view(), &small_config()));
            for c in 0..3 {
                assert_abs_diff_eq!(avg.values[c], base.values[c], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn out_of_range_indicator_counts_as_fully_missing() {
        let avg: TileAverages = serde_json::from_str(
            r#"{"values":{"v":1,"dim":[2],"data":[0.2,0.0]},"missing_channel":7,"valid_pixels":4,"total_pixels":4}"#,
        )
        .unwrap();
        assert_eq!(avg.missing_fraction(), 1.0);
        assert_eq!(avg.fraction_valid(), 0.0);
    }

    #[test]
    fn fraction_valid_stays_in_unit_interval() {
        for occluded in 0..4 {
            let mut tile = Array3::<f64>::ones((3, 2, 2));
            tile.slice_mut(s![2, .., ..]).fill(0.0);
            for p in 0..occluded {
                tile[[2, p / 2, p % 2]] = 1.0;
            }
            let avg = accepted(average_tile(tile.view(), &small_config()));
            let fv = avg.fraction_valid();
            assert!((0.0..=1.0).contains(&fv));
            assert_abs_diff_eq!(fv, 1.0 - avg.values[2], epsilon = 1e-15);
            assert_abs_diff_eq!(fv, (4 - occluded) as f64 / 4.0, epsilon = 1e-12);
        }
    }
}
