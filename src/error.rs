//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, CSV, NPY and GDAL errors, and provides semantic variants
//! for argument validation and layout problems. Per-tile rejections are not errors;
//! they travel as [`crate::types::RejectReason`].
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tile reader error: {0}")]
    Tile(#[from] crate::io::TileIoError),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Invalid channel layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid metadata record {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl Error {
    pub fn processing<E: std::fmt::Display>(e: E) -> Self {
        Error::Processing(e.to_string())
    }
}
