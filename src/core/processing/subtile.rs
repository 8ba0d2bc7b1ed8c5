use ndarray::{ArrayView3, s};
use serde::{Deserialize, Serialize};

use crate::core::params::AveragingConfig;
use crate::core::processing::averager::average_tile;
use crate::error::{Error, Result};
use crate::types::TileOutcome;

/// Averages of one square window of a larger tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtileOutcome {
    pub grid_row: usize,
    pub grid_col: usize,
    pub outcome: TileOutcome,
}

/// Split `tile` into `subtile_pixels` x `subtile_pixels` windows (row-major order) and
/// average each one. Trailing rows/columns that do not fill a whole window are dropped.
pub fn subtile_averages(
    tile: ArrayView3<'_, f64>,
    subtile_pixels: usize,
    config: &AveragingConfig,
) -> Result<Vec<SubtileOutcome>> {
    let (_, rows, cols) = tile.dim();
    if subtile_pixels == 0 || subtile_pixels > rows || subtile_pixels > cols {
        return Err(Error::InvalidArgument {
            arg: "subtile_pixels",
            value: format!("{} (tile is {}x{})", subtile_pixels, rows, cols),
        });
    }

    let grid_rows = rows / subtile_pixels;
    let grid_cols = cols / subtile_pixels;
    let mut out = Vec::with_capacity(grid_rows * grid_cols);
    for grid_row in 0..grid_rows {
        let top = grid_row * subtile_pixels;
        for grid_col in 0..grid_cols {
            let left = grid_col * subtile_pixels;
            let window = tile.slice(s![
                ..,
                top..top + subtile_pixels,
                left..left + subtile_pixels
            ]);
            out.push(SubtileOutcome {
                grid_row,
                grid_col,
                outcome: average_tile(window, config),
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn config() -> AveragingConfig {
        AveragingConfig {
            occlusion_sensitive_channels: vec![0],
            missing_indicator_channel: None,
            land_cover_channels: vec![],
            min_coverage: None,
        }
    }

    #[test]
    fn grid_drops_partial_windows() {
        let tile = Array3::<f64>::zeros((2, 5, 7));
        let subtiles = subtile_averages(tile.view(), 2, &config()).unwrap();
        assert_eq!(subtiles.len(), 2 * 3);
        let last = subtiles.last().unwrap();
        assert_eq!((last.grid_row, last.grid_col), (1, 2));
    }

    #[test]
    fn each_window_is_masked_independently() {
        let mut tile = Array3::<f64>::zeros((2, 2, 4));
        // left window: values 1..4, one occluded pixel
        tile[[0, 0, 0]] = 1.0;
        tile[[0, 0, 1]] = 2.0;
        tile[[0, 1, 0]] = 3.0;
        tile[[0, 1, 1]] = 4.0;
        tile[[1, 1, 1]] = 1.0;
        // right window fully occluded
        tile.slice_mut(s![1, .., 2..4]).fill(1.0);

        let subtiles = subtile_averages(tile.view(), 2, &config()).unwrap();
        match &subtiles[0].outcome {
            TileOutcome::Accepted(avg) => {
                assert!((avg.values[0] - 2.0).abs() < 1e-12);
                assert!((avg.fraction_valid() - 0.75).abs() < 1e-12);
            }
            other => panic!("left window rejected: {:?}", other),
        }
        assert_eq!(
            subtiles[1].outcome.rejection().map(|r| r.code()),
            Some("all_pixels_occluded")
        );
    }

    #[test]
    fn oversized_window_is_an_error() {
        let tile = Array3::<f64>::zeros((2, 4, 4));
        assert!(subtile_averages(tile.view(), 0, &config()).is_err());
        assert!(subtile_averages(tile.view(), 5, &config()).is_err());
        assert_eq!(subtile_averages(tile.view(), 4, &config()).unwrap().len(), 1);
    }
}
