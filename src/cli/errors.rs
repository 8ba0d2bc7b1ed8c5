use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid threshold {arg}={value}: must be a finite number")]
    InvalidThreshold { arg: &'static str, value: f64 },

    #[error("Sub-tile size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error(transparent)]
    Siftile(#[from] siftile::Error),
}
