use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::core::layout::ChannelLayout;
use crate::core::processing::averager::TileAverages;
use crate::error::{Error, Result};
use crate::io::metadata::TileRecord;

/// Streams accepted tiles into a CSV of per-channel averages.
///
/// Columns: `lon, lat, date, tile_file`, one column per layout channel,
/// `fraction_valid, SIF, cloud_fraction, num_soundings`.
pub struct DatasetWriter {
    writer: csv::Writer<File>,
    channels: usize,
    rows: usize,
}

impl DatasetWriter {
    pub fn create(path: &Path, layout: &ChannelLayout) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header: Vec<&str> = vec!["lon", "lat", "date", "tile_file"];
        header.extend(layout.names.iter().map(String::as_str));
        header.extend(["fraction_valid", "SIF", "cloud_fraction", "num_soundings"]);
        writer.write_record(&header)?;
        Ok(Self {
            writer,
            channels: layout.channels(),
            rows: 0,
        })
    }

    pub fn write_row(&mut self, record: &TileRecord, averages: &TileAverages) -> Result<()> {
        if averages.len() != self.channels {
            return Err(Error::Processing(format!(
                "{} has {} channels, layout has {}",
                record.tile_file,
                averages.len(),
                self.channels
            )));
        }
        let mut row: Vec<String> = Vec::with_capacity(self.channels + 8);
        row.push(record.lon.to_string());
        row.push(record.lat.to_string());
        row.push(record.date.clone());
        row.push(record.tile_file.clone());
        row.extend(averages.values.iter().map(|v| v.to_string()));
        row.push(averages.fraction_valid().to_string());
        row.push(record.sif.to_string());
        row.push(optional(record.cloud_fraction));
        row.push(optional(record.num_soundings));
        self.writer.write_record(&row)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        info!("Wrote {} dataset rows", self.rows);
        Ok(self.rows)
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
