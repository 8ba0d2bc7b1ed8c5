#![doc = r#"
SIFTILE — masked band averaging for solar-induced fluorescence (SIF) tile datasets.

This crate turns multi-band raster tiles (reflectance, weather, land-cover fractions and a
missing-reflectance indicator) into per-channel averages, rejects tiles that are fully
occluded, corrupt, or insufficiently covered by labelled land cover, and assembles the accepted
tiles into a tabular dataset. It powers the `siftile` CLI and can be embedded in your own
Rust applications.

Quick start: average one tile in memory
---------------------------------------
```rust
use ndarray::Array3;
use siftile::{average_tile, AveragingConfig, TileOutcome};

// 2 reflectance channels + missing indicator, 2x2 pixels, one occluded pixel
let mut tile = Array3::<f64>::zeros((3, 2, 2));
tile[[0, 0, 0]] = 1.0; tile[[0, 0, 1]] = 2.0; tile[[0, 1, 0]] = 3.0; tile[[0, 1, 1]] = 4.0;
tile[[2, 1, 0]] = 1.0;

let config = AveragingConfig {
    occlusion_sensitive_channels: vec![0, 1],
    missing_indicator_channel: None, // last channel
    land_cover_channels: vec![],
    min_coverage: None,
};

match average_tile(tile.view(), &config) {
    TileOutcome::Accepted(avg) => {
        assert!((avg.values[0] - 7.0 / 3.0).abs() < 1e-12);
        assert!((avg.fraction_valid() - 0.75).abs() < 1e-12);
    }
    TileOutcome::Rejected(reason) => panic!("rejected: {reason}"),
}
```

Build a dataset from tile metadata
----------------------------------
```rust,no_run
use std::path::Path;
use siftile::{build_dataset, BuildParams, DatasetFilter};

fn main() -> siftile::Result<()> {
    let params = BuildParams {
        filter: DatasetFilter {
            min_fraction_valid: Some(0.75),
            ..Default::default()
        },
        ..Default::default()
    };

    let report = build_dataset(
        Path::new("/data/dataset_2018-08-01/reflectance_cover_to_sif.csv"),
        Path::new("/data/dataset_2018-08-01/tile_averages.csv"),
        &params,
    )?;

    println!("accepted={} rejected={}", report.accepted, report.rejected_total());
    Ok(())
}
```

Error handling
--------------
Per-tile rejections are values (`TileOutcome::Rejected(RejectReason)`), never errors. Operational
failures (unreadable metadata, unwritable outputs) return `siftile::Result<T>`; match on
`siftile::Error` to handle specific cases.

Feature flags
-------------
- `gdal`: read GeoTIFF tiles through GDAL (needs GDAL development headers).
- `full`: enables every optional input format.

Useful modules
--------------
- [`api`] — high-level entry points (single tile files, dataset builds).
- [`core`] — channel layout, averaging configuration and the processing primitives.
- [`types`] — `TileOutcome`, `RejectReason`, `InputFormat`.
- [`io`] — tile readers, metadata CSV reader and dataset writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::layout::ChannelLayout;
pub use crate::core::params::{AveragingConfig, BuildParams, DEFAULT_MIN_COVERAGE};
pub use crate::core::processing::averager::{TileAverages, average_tile};
pub use crate::core::processing::filters::DatasetFilter;
pub use crate::core::processing::stats::{BandStatistics, DEFAULT_STANDARDIZE_CLIP, standardize};
pub use crate::core::processing::subtile::{SubtileOutcome, subtile_averages};
pub use error::{Error, Result};
pub use types::{InputFormat, RejectReason, TileOutcome};

// Readers
pub use io::metadata::{TileRecord, read_tile_records};
pub use io::npy::{TileIoError, load_tile, read_npy_tile};

#[cfg(feature = "gdal")]
pub use io::gdal::{GdalError, GdalTileReader};

// Writers
pub use io::writers::dataset::DatasetWriter;
pub use io::writers::report::write_report;
pub use io::writers::statistics::{write_band_statistics, write_standardized_rows};

// High-level API re-exports
pub use api::{
    BuildReport, average_tile_file, build_dataset, build_dataset_with_statistics,
    build_standardized_dataset, evaluate_record, subtile_averages_file,
};
