use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::{Array3, s};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors encountered when using GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2} values")]
    DimensionMismatch(usize, usize, usize),
}

/// Metadata extracted from a multi-band tile raster
#[derive(Debug, Clone)]
pub struct GdalTileMetadata {
    /// Width (columns) of the raster
    pub size_x: usize,
    /// Height (rows) of the raster
    pub size_y: usize,
    /// Number of raster bands, one per tile channel
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    pub projection: String,
    /// Band descriptions in band order (empty when unset)
    pub band_names: Vec<String>,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Reads a multi-band GeoTIFF (or any GDAL raster) as a (channel, row, column) tile
pub struct GdalTileReader {
    pub dataset: Dataset,
    pub metadata: GdalTileMetadata,
}

impl GdalTileReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = match dataset.geo_transform() {
            Ok(gt) => gt,
            Err(_) => [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };
        let projection = dataset.projection();

        let mut band_names = Vec::with_capacity(bands);
        for idx in 1..=bands {
            band_names.push(dataset.rasterband(idx)?.description().unwrap_or_default());
        }

        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        debug!(
            "Opened {:?}: {} bands, {}x{}",
            path.as_ref(),
            bands,
            size_x,
            size_y
        );
        Ok(GdalTileReader {
            dataset,
            metadata: GdalTileMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                projection,
                band_names,
                metadata: metadata_map,
            },
        })
    }

    /// Read every band (1-based in GDAL) into channel `band - 1` of the tile
    pub fn read_tile(&self) -> Result<Array3<f64>, GdalError> {
        let (cols, rows) = (self.metadata.size_x, self.metadata.size_y);
        let mut tile = Array3::<f64>::zeros((self.metadata.bands, rows, cols));
        for idx in 1..=self.metadata.bands {
            let band = self.dataset.rasterband(idx)?;
            let buf = band.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)?;
            let data = buf.data();
            if data.len() != rows * cols {
                return Err(GdalError::DimensionMismatch(cols, rows, data.len()));
            }
            let plane = ndarray::ArrayView2::from_shape((rows, cols), data)
                .map_err(|_| GdalError::DimensionMismatch(cols, rows, data.len()))?;
            tile.slice_mut(s![idx - 1, .., ..]).assign(&plane);
        }
        Ok(tile)
    }
}
