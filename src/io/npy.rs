use std::path::{Path, PathBuf};

use ndarray::Array3;
use ndarray_npy::{ReadNpyError, read_npy};
use thiserror::Error;
use tracing::debug;

use crate::types::InputFormat;

/// Errors encountered when loading a tile array from disk
#[derive(Debug, Error)]
pub enum TileIoError {
    #[error("cannot read {path:?}: {source}")]
    Npy {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },
    #[error("Unsupported tile format: {0:?}")]
    UnsupportedFormat(PathBuf),
    #[error("GeoTIFF tiles need the `gdal` feature: {0:?}")]
    GdalDisabled(PathBuf),
    #[cfg(feature = "gdal")]
    #[error(transparent)]
    Gdal(#[from] crate::io::gdal::GdalError),
}

/// Read a (channel, row, column) `.npy` tile stored as `float64` or `float32`.
pub fn read_npy_tile(path: &Path) -> Result<Array3<f64>, TileIoError> {
    match read_npy::<_, Array3<f64>>(path) {
        Ok(tile) => Ok(tile),
        Err(ReadNpyError::WrongDescriptor(_)) => {
            debug!("{:?} is not float64, retrying as float32", path);
            let tile: Array3<f32> = read_npy(path).map_err(|source| TileIoError::Npy {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(tile.mapv(f64::from))
        }
        Err(source) => Err(TileIoError::Npy {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a tile in the given (or extension-derived) format.
pub fn load_tile(path: &Path, format: InputFormat) -> Result<Array3<f64>, TileIoError> {
    match format.resolve(path) {
        Some(InputFormat::Npy) => read_npy_tile(path),
        Some(InputFormat::GeoTiff) => read_geotiff_tile(path),
        _ => Err(TileIoError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(feature = "gdal")]
fn read_geotiff_tile(path: &Path) -> Result<Array3<f64>, TileIoError> {
    let reader = crate::io::gdal::GdalTileReader::open(path)?;
    Ok(reader.read_tile()?)
}

#[cfg(not(feature = "gdal"))]
fn read_geotiff_tile(path: &Path) -> Result<Array3<f64>, TileIoError> {
    Err(TileIoError::GdalDisabled(path.to_path_buf()))
}
