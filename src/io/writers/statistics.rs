use std::path::Path;

use crate::core::processing::stats::BandStatistics;
use crate::error::{Error, Result};

/// Write `band,mean,std` rows, one per statistics column.
pub fn write_band_statistics(path: &Path, stats: &BandStatistics) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["band", "mean", "std"])?;
    for ((name, mean), std) in stats.columns.iter().zip(&stats.mean).zip(&stats.std) {
        writer.write_record([name.clone(), mean.to_string(), std.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `tile_file` followed by each statistics column, one standardized row per tile.
pub fn write_standardized_rows(
    path: &Path,
    stats: &BandStatistics,
    tile_files: &[String],
    rows: &[Vec<f64>],
    clip: f64,
) -> Result<()> {
    if tile_files.len() != rows.len() {
        return Err(Error::Processing(format!(
            "{} tile files for {} rows",
            tile_files.len(),
            rows.len()
        )));
    }
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["tile_file".to_string()];
    header.extend(stats.columns.iter().cloned());
    writer.write_record(&header)?;
    for (tile_file, row) in tile_files.iter().zip(rows) {
        let mut record = vec![tile_file.clone()];
        record.extend(
            stats
                .standardize_row(row, clip)
                .into_iter()
                .map(|v| v.to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
