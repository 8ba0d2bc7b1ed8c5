//! Tile metadata rows: one CSV row per tile naming its location, date,
//! array file and the SIF label it is paired with.
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub lon: f64,
    pub lat: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub tile_file: String,
    #[serde(rename = "SIF")]
    pub sif: f64,
    #[serde(default)]
    pub cloud_fraction: Option<f64>,
    #[serde(default)]
    pub num_soundings: Option<f64>,
}

impl TileRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// (year, month, day of year)
    pub fn date_parts(&self) -> Option<(i32, u32, u32)> {
        self.parsed_date()
            .map(|d| (d.year(), d.month(), d.ordinal()))
    }

    /// Tile path; relative paths are taken from `base_dir`.
    pub fn tile_path(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.tile_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

/// Read all rows of a tile metadata CSV. Extra columns are ignored.
pub fn read_tile_records(path: &Path) -> Result<Vec<TileRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<TileRecord>().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = row?;
        if record.parsed_date().is_none() {
            return Err(Error::InvalidRecord {
                line,
                reason: format!("date {:?} is not YYYY-MM-DD", record.date),
            });
        }
        records.push(record);
    }
    info!("Read {} tile records from {:?}", records.len(), path);
    Ok(records)
}
