//! I/O layer: tile readers (`.npy`, and GeoTIFF through GDAL with the `gdal`
//! feature), the tile metadata CSV reader, and `writers` for the averaged
//! dataset, band statistics and the JSON build report.
pub mod npy;
pub use npy::{TileIoError, load_tile, read_npy_tile};

#[cfg(feature = "gdal")]
pub mod gdal;
#[cfg(feature = "gdal")]
pub use gdal::{GdalError, GdalTileMetadata, GdalTileReader};

pub mod metadata;
pub use metadata::{TileRecord, read_tile_records};

pub mod writers;
