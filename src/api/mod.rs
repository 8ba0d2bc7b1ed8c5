//! High-level, ergonomic library API: average a single tile file, split one into
//! sub-tiles, or build a whole averaged dataset from a tile metadata CSV. Prefer
//! these entrypoints over the low-level processing modules when integrating SIFTILE.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::params::{AveragingConfig, BuildParams};
use crate::core::processing::averager::{TileAverages, average_tile};
use crate::core::processing::stats::BandStatistics;
use crate::core::processing::subtile::{SubtileOutcome, subtile_averages};
use crate::error::Result;
use crate::io::metadata::{TileRecord, read_tile_records};
use crate::io::npy::{TileIoError, load_tile};
use crate::io::writers::dataset::DatasetWriter;
use crate::io::writers::statistics::{write_band_statistics, write_standardized_rows};
use crate::types::{InputFormat, RejectReason, TileOutcome};

/// Summary of a dataset build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub total: usize,
    pub accepted: usize,
    /// Rejection counts keyed by reason code
    pub rejected: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl BuildReport {
    fn new(metadata: &Path, output: &Path, total: usize) -> Self {
        Self {
            metadata: metadata.to_path_buf(),
            output: output.to_path_buf(),
            total,
            accepted: 0,
            rejected: BTreeMap::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, code: &str) -> usize {
        self.rejected.get(code).copied().unwrap_or(0)
    }

    fn reject(&mut self, reason: &RejectReason) {
        *self.rejected.entry(reason.code().to_string()).or_insert(0) += 1;
    }
}

/// Load a tile file and average it
pub fn average_tile_file(
    path: &Path,
    format: InputFormat,
    config: &AveragingConfig,
) -> Result<TileOutcome> {
    let tile = load_tile(path, format)?;
    Ok(average_tile(tile.view(), config))
}

/// Load a tile file and average each `subtile_pixels` square window
pub fn subtile_averages_file(
    path: &Path,
    format: InputFormat,
    subtile_pixels: usize,
    config: &AveragingConfig,
) -> Result<Vec<SubtileOutcome>> {
    let tile = load_tile(path, format)?;
    subtile_averages(tile.view(), subtile_pixels, config)
}

/// Average one metadata row and run the dataset filters on the result
pub fn evaluate_record(
    record: &TileRecord,
    base_dir: &Path,
    params: &BuildParams,
    config: &AveragingConfig,
) -> std::result::Result<TileOutcome, TileIoError> {
    let path = record.tile_path(base_dir);
    let tile = load_tile(&path, params.input_format)?;
    // the config's channel indices only mean something for tiles of the layout's width
    let channels = tile.dim().0;
    if channels != params.layout.channels() {
        return Ok(TileOutcome::Rejected(RejectReason::invalid_shape(format!(
            "tile has {} channels, layout has {}",
            channels,
            params.layout.channels()
        ))));
    }
    Ok(match average_tile(tile.view(), config) {
        TileOutcome::Accepted(averages) => match params.filter.check(record, &averages) {
            Some(reason) => TileOutcome::Rejected(reason),
            None => TileOutcome::Accepted(averages),
        },
        rejected => rejected,
    })
}

/// Build the averaged dataset at `output` from the rows of `metadata`.
/// Relative `tile_file` paths are resolved against the directory of `metadata`.
pub fn build_dataset(metadata: &Path, output: &Path, params: &BuildParams) -> Result<BuildReport> {
    let (report, _) = run_build(metadata, output, params, false)?;
    Ok(report)
}

/// Like [`build_dataset`], and also write per-column mean/std of the accepted
/// rows (channel averages followed by SIF) to `statistics`.
pub fn build_dataset_with_statistics(
    metadata: &Path,
    output: &Path,
    statistics: &Path,
    params: &BuildParams,
) -> Result<(BuildReport, BandStatistics)> {
    build_with_statistics(metadata, output, statistics, None, params)
}

/// Like [`build_dataset_with_statistics`], and also write the accepted rows
/// standardized against those statistics (clipped to `params.standardize_clip`)
/// to `standardized`.
pub fn build_standardized_dataset(
    metadata: &Path,
    output: &Path,
    statistics: &Path,
    standardized: &Path,
    params: &BuildParams,
) -> Result<(BuildReport, BandStatistics)> {
    build_with_statistics(metadata, output, statistics, Some(standardized), params)
}

fn build_with_statistics(
    metadata: &Path,
    output: &Path,
    statistics: &Path,
    standardized: Option<&Path>,
    params: &BuildParams,
) -> Result<(BuildReport, BandStatistics)> {
    let (report, rows) = run_build(metadata, output, params, true)?;
    let (tile_files, values): (Vec<String>, Vec<Vec<f64>>) = rows.into_iter().unzip();
    let mut columns = params.layout.names.clone();
    columns.push("SIF".to_string());
    let stats = BandStatistics::from_rows(columns, &values)?;
    write_band_statistics(statistics, &stats)?;
    info!("Band statistics written to {:?}", statistics);
    if let Some(path) = standardized {
        write_standardized_rows(path, &stats, &tile_files, &values, params.standardize_clip)?;
        info!("Standardized dataset written to {:?}", path);
    }
    Ok((report, stats))
}

fn run_build(
    metadata: &Path,
    output: &Path,
    params: &BuildParams,
    keep_rows: bool,
) -> Result<(BuildReport, Vec<(String, Vec<f64>)>)> {
    params.layout.validate()?;
    let config = params.averaging_config();
    let records = read_tile_records(metadata)?;
    let base_dir = metadata.parent().unwrap_or_else(|| Path::new("."));

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(
        "Averaging {} tiles ({})",
        records.len(),
        if params.parallel { "parallel" } else { "sequential" }
    );
    let outcomes: Vec<std::result::Result<TileOutcome, TileIoError>> = if params.parallel {
        records
            .par_iter()
            .map(|record| evaluate_record(record, base_dir, params, &config))
            .collect()
    } else {
        records
            .iter()
            .map(|record| evaluate_record(record, base_dir, params, &config))
            .collect()
    };

    let mut report = BuildReport::new(metadata, output, records.len());
    let mut writer = DatasetWriter::create(output, &params.layout)?;
    let mut rows = Vec::new();

    for (i, (record, outcome)) in records.iter().zip(outcomes).enumerate() {
        if i % 100 == 0 {
            debug!("Processing tile {}", i);
        }
        match outcome {
            Ok(TileOutcome::Accepted(averages)) => {
                writer.write_row(record, &averages)?;
                if keep_rows {
                    rows.push((record.tile_file.clone(), stat_row(&averages, record.sif)));
                }
                report.accepted += 1;
            }
            Ok(TileOutcome::Rejected(reason)) => {
                log_rejection(record, &reason);
                report.reject(&reason);
            }
            Err(e) => {
                if !params.continue_on_error {
                    return Err(e.into());
                }
                warn!("Error loading {}: {}", record.tile_file, e);
                report.reject(&RejectReason::LoadFailed {
                    detail: e.to_string(),
                });
            }
        }
    }
    writer.finish()?;

    info!("Dataset build complete!");
    info!("Accepted: {}", report.accepted);
    for (code, count) in &report.rejected {
        info!("Rejected ({}): {}", code, count);
    }
    Ok((report, rows))
}

fn stat_row(averages: &TileAverages, sif: f64) -> Vec<f64> {
    let mut row = averages.values.to_vec();
    row.push(sif);
    row
}

fn log_rejection(record: &TileRecord, reason: &RejectReason) {
    match reason {
        RejectReason::CorruptAverage { .. } | RejectReason::InvalidTileShape { .. } => {
            warn!("{} [{}]: {}", record.tile_file, reason.code(), reason)
        }
        _ => debug!("{} [{}]: {}", record.tile_file, reason.code(), reason),
    }
}
